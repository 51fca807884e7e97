//! Storage trait definitions and filter types.
//!
//! The record store is deliberately thin: point lookup by id, insert,
//! whole-record update, and filtered queries over a named collection.
//! Everything the services need (copy-count updates, the due-date scan)
//! is built on these primitives.

use crate::error::Result;
use serde::{Serialize, de::DeserializeOwned};

/// Filter operations for querying records.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Field equals value
    Eq,
    /// Field does not equal value
    Ne,
}

/// A filter for querying records by a top-level field.
#[derive(Debug, Clone)]
pub struct Filter {
    /// Field name to filter on
    pub field: String,
    /// Filter operation
    pub op: FilterOp,
    /// Value to compare against
    pub value: serde_json::Value,
}

impl Filter {
    /// Create an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Serialize) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq,
            value: serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
        }
    }

    /// Create a not-equal filter.
    pub fn ne(field: impl Into<String>, value: impl Serialize) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Ne,
            value: serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
        }
    }

    /// Check if a record matches this filter.
    pub fn matches(&self, record: &serde_json::Value) -> bool {
        let field_value = record.get(&self.field);

        match &self.op {
            FilterOp::Eq => match field_value {
                Some(v) => *v == self.value,
                None => self.value.is_null(),
            },
            FilterOp::Ne => match field_value {
                Some(v) => *v != self.value,
                None => !self.value.is_null(),
            },
        }
    }
}

/// Trait for records that have an ID field.
pub trait HasId {
    /// Get the record's unique identifier.
    fn id(&self) -> &str;
}

/// Storage trait for CRUD operations on records.
///
/// Implementations must make `update` a consistent whole-record swap: a
/// concurrent reader sees either the old record or the new one, never a
/// torn write.
pub trait Storage: Send + Sync {
    /// Create a new record.
    fn create<T: Serialize + DeserializeOwned + HasId>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<()>;

    /// Get a record by ID.
    fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>>;

    /// Update an existing record. Errors if the record does not exist.
    fn update<T: Serialize + DeserializeOwned + HasId>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<()>;

    /// Delete a record by ID.
    fn delete(&self, collection: &str, id: &str) -> Result<()>;

    /// Query records with filters.
    fn query<T: DeserializeOwned>(&self, collection: &str, filters: &[Filter]) -> Result<Vec<T>>;

    /// List all records in a collection.
    fn list<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_eq_matches() {
        let filter = Filter::eq("author", "Orwell");
        let record = json!({"id": "book-1", "author": "Orwell"});
        assert!(filter.matches(&record));
    }

    #[test]
    fn test_filter_eq_no_match() {
        let filter = Filter::eq("author", "Orwell");
        let record = json!({"id": "book-1", "author": "Herbert"});
        assert!(!filter.matches(&record));
    }

    #[test]
    fn test_filter_eq_on_object_value() {
        // Loan status serializes as a tagged object; equality compares the
        // whole object.
        let filter = Filter::eq("status", json!({"state": "active"}));
        let active = json!({"id": "loan-1", "status": {"state": "active"}});
        let returned =
            json!({"id": "loan-2", "status": {"state": "returned", "at": "2025-06-01T12:00:00Z"}});
        assert!(filter.matches(&active));
        assert!(!filter.matches(&returned));
    }

    #[test]
    fn test_filter_eq_missing_field_matches_null() {
        let filter = Filter::eq("missing", serde_json::Value::Null);
        let record = json!({"id": "1"});
        assert!(filter.matches(&record));
    }

    #[test]
    fn test_filter_ne() {
        let filter = Filter::ne("user_id", "user-1");
        assert!(filter.matches(&json!({"user_id": "user-2"})));
        assert!(!filter.matches(&json!({"user_id": "user-1"})));
    }
}
