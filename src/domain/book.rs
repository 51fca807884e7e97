//! Book record and copy-count accounting.
//!
//! A book carries two counts: `total_copies` (how many the library owns)
//! and `available_copies` (how many are on the shelf right now). The
//! invariant `0 <= available_copies <= total_copies` holds at every
//! observable point; only the inventory ledger mutates either field.

use crate::error::{CirculateError, Result};
use crate::id::generate_book_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog entry with a total and currently-available copy count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Unique identifier ("book-1738300800123-a1b2")
    pub id: String,

    pub title: String,
    pub author: String,

    /// Copies the library owns
    pub total_copies: u32,

    /// Copies currently on the shelf
    pub available_copies: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Register a new book. Starts fully available.
    ///
    /// Fails with `InvalidCopyCount` when `total_copies` is zero.
    pub fn new(title: &str, author: &str, total_copies: u32, now: DateTime<Utc>) -> Result<Self> {
        if total_copies == 0 {
            return Err(CirculateError::InvalidCopyCount(
                "total_copies must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            id: generate_book_id(),
            title: title.to_string(),
            author: author.to_string(),
            total_copies,
            available_copies: total_copies,
            created_at: now,
            updated_at: now,
        })
    }

    /// Copies currently out on loan.
    pub fn on_loan(&self) -> u32 {
        self.total_copies - self.available_copies
    }

    /// Whether at least one copy is on the shelf.
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Update the timestamp
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_new_book_starts_fully_available() {
        let book = Book::new("1984", "George Orwell", 3, now()).unwrap();
        assert_eq!(book.total_copies, 3);
        assert_eq!(book.available_copies, 3);
        assert_eq!(book.on_loan(), 0);
        assert!(book.is_available());
        assert!(book.id.starts_with("book-"));
    }

    #[test]
    fn test_new_book_rejects_zero_copies() {
        let err = Book::new("Empty", "Nobody", 0, now()).unwrap_err();
        assert!(matches!(err, CirculateError::InvalidCopyCount(_)));
    }

    #[test]
    fn test_on_loan_is_total_minus_available() {
        let mut book = Book::new("Dune", "Frank Herbert", 5, now()).unwrap();
        book.available_copies = 2;
        assert_eq!(book.on_loan(), 3);
    }

    #[test]
    fn test_exhausted_book_is_unavailable() {
        let mut book = Book::new("Dune", "Frank Herbert", 1, now()).unwrap();
        book.available_copies = 0;
        assert!(!book.is_available());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let book = Book::new("1984", "George Orwell", 2, now()).unwrap();
        let json = serde_json::to_string(&book).unwrap();
        let restored: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(book, restored);
    }
}
