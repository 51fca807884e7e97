//! User record.

use crate::id::generate_user_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered library member. Immutable once created; lending and the
/// reminder scan only read it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier ("user-1738300800123-a1b2")
    pub id: String,

    pub name: String,
    pub email: String,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Register a new user.
    pub fn new(name: &str, email: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: generate_user_id(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_user_fields() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let user = User::new("Ada Lovelace", "ada@example.com", now);
        assert!(user.id.starts_with("user-"));
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.created_at, now);
    }
}
