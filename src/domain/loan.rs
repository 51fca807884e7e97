//! Loan record and its two-state lifecycle.
//!
//! A loan binds one user to one book for a bounded period. Its status is a
//! tagged enum rather than a nullable timestamp so that `Returned` is
//! terminal by construction: there is no way to clear the return time and
//! resurrect a loan.

use crate::id::generate_loan_id;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A record binding one user to one book for a bounded period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Loan {
    /// Unique identifier ("loan-1738300800123-a1b2")
    pub id: String,

    /// Borrowing user (back-reference by id; no ownership)
    pub user_id: String,

    /// Borrowed book (back-reference by id; no ownership)
    pub book_id: String,

    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,

    /// Current lifecycle state
    pub status: LoanStatus,
}

/// Lifecycle state of a loan. `Returned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum LoanStatus {
    /// Out with the borrower
    Active,
    /// Back on the shelf
    Returned { at: DateTime<Utc> },
}

impl LoanStatus {
    /// Returns true if the loan is still out.
    pub fn is_active(&self) -> bool {
        matches!(self, LoanStatus::Active)
    }
}

impl Loan {
    /// Create a new active loan due `duration` after `now`.
    pub fn new(user_id: &str, book_id: &str, now: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            id: generate_loan_id(),
            user_id: user_id.to_string(),
            book_id: book_id.to_string(),
            borrowed_at: now,
            due_at: now + duration,
            status: LoanStatus::Active,
        }
    }

    /// Returns true if the loan is still out.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// When the loan came back, if it has.
    pub fn returned_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            LoanStatus::Active => None,
            LoanStatus::Returned { at } => Some(at),
        }
    }

    /// Whether this active loan falls due on or before `bound`.
    /// Returned loans never qualify.
    pub fn is_due_by(&self, bound: DateTime<Utc>) -> bool {
        self.is_active() && self.due_at <= bound
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
    fn test_new_loan_is_active_with_due_date() {
        let loan = Loan::new("user-1", "book-1", now(), Duration::days(1));
        assert!(loan.id.starts_with("loan-"));
        assert!(loan.is_active());
        assert_eq!(loan.borrowed_at, now());
        assert_eq!(loan.due_at, now() + Duration::days(1));
        assert_eq!(loan.returned_at(), None);
    }

    #[test]
    fn test_returned_status_carries_timestamp() {
        let mut loan = Loan::new("user-1", "book-1", now(), Duration::days(1));
        let returned = now() + Duration::hours(6);
        loan.status = LoanStatus::Returned { at: returned };
        assert!(!loan.is_active());
        assert_eq!(loan.returned_at(), Some(returned));
    }

    #[test]
    fn test_is_due_by_boundary() {
        let loan = Loan::new("user-1", "book-1", now(), Duration::hours(2));
        assert!(loan.is_due_by(now() + Duration::hours(2)));
        assert!(loan.is_due_by(now() + Duration::days(1)));
        assert!(!loan.is_due_by(now() + Duration::hours(1)));
    }

    #[test]
    fn test_returned_loan_never_due() {
        let mut loan = Loan::new("user-1", "book-1", now(), Duration::hours(2));
        loan.status = LoanStatus::Returned { at: now() };
        assert!(!loan.is_due_by(now() + Duration::days(7)));
    }

    #[test]
    fn test_status_serialization_tags() {
        let active = serde_json::to_value(LoanStatus::Active).unwrap();
        assert_eq!(active["state"], "active");

        let returned = serde_json::to_value(LoanStatus::Returned { at: now() }).unwrap();
        assert_eq!(returned["state"], "returned");
        assert!(returned.get("at").is_some());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let loan = Loan::new("user-1", "book-1", now(), Duration::days(1));
        let json = serde_json::to_string(&loan).unwrap();
        let restored: Loan = serde_json::from_str(&json).unwrap();
        assert_eq!(loan, restored);
    }
}
