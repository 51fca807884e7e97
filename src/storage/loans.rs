//! Loan-collection storage helpers.

use super::traits::{Filter, HasId, Storage};
use crate::domain::Loan;
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Collection name for loans.
pub const LOANS_COLLECTION: &str = "loans";

impl HasId for Loan {
    fn id(&self) -> &str {
        &self.id
    }
}

fn active_status_value() -> serde_json::Value {
    serde_json::json!({ "state": "active" })
}

/// Helper for loan-specific queries.
pub struct LoanStore<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> LoanStore<'a, S> {
    /// Create a new LoanStore wrapping the given storage.
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Get a loan by ID.
    pub fn get(&self, id: &str) -> Result<Option<Loan>> {
        self.storage.get(LOANS_COLLECTION, id)
    }

    /// Record a new loan.
    pub fn create(&self, loan: &Loan) -> Result<()> {
        self.storage.create(LOANS_COLLECTION, loan)
    }

    /// Update an existing loan.
    pub fn update(&self, loan: &Loan) -> Result<()> {
        self.storage.update(LOANS_COLLECTION, loan)
    }

    /// Find all unreturned loans.
    pub fn find_active(&self) -> Result<Vec<Loan>> {
        self.storage.query(
            LOANS_COLLECTION,
            &[Filter::eq("status", active_status_value())],
        )
    }

    /// Find all unreturned loans held by a user.
    pub fn find_active_by_user(&self, user_id: &str) -> Result<Vec<Loan>> {
        self.storage.query(
            LOANS_COLLECTION,
            &[
                Filter::eq("status", active_status_value()),
                Filter::eq("user_id", user_id),
            ],
        )
    }

    /// Lending history of a book, returned loans included.
    pub fn find_history_by_book(&self, book_id: &str) -> Result<Vec<Loan>> {
        self.storage
            .query(LOANS_COLLECTION, &[Filter::eq("book_id", book_id)])
    }

    /// Find all unreturned loans due on or before `bound`.
    ///
    /// The due-date comparison is done here rather than in a storage filter
    /// so it works on the typed timestamp instead of its serialized form.
    pub fn find_due_by(&self, bound: DateTime<Utc>) -> Result<Vec<Loan>> {
        let mut due: Vec<Loan> = self
            .find_active()?
            .into_iter()
            .filter(|loan| loan.is_due_by(bound))
            .collect();
        due.sort_by_key(|loan| loan.due_at);
        Ok(due)
    }

    /// List all loans.
    pub fn list_all(&self) -> Result<Vec<Loan>> {
        self.storage.list(LOANS_COLLECTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LoanStatus;
    use crate::storage::JsonlStorage;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn create_test_storage() -> (JsonlStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = JsonlStorage::new(temp_dir.path()).unwrap();
        (storage, temp_dir)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_create_and_get_loan() {
        let (storage, _temp) = create_test_storage();
        let loans = LoanStore::new(&storage);

        let loan = Loan::new("user-1", "book-1", now(), Duration::days(1));
        loans.create(&loan).unwrap();

        assert_eq!(loans.get(&loan.id).unwrap(), Some(loan));
    }

    #[test]
    fn test_find_active_excludes_returned() {
        let (storage, _temp) = create_test_storage();
        let loans = LoanStore::new(&storage);

        let active = Loan::new("user-1", "book-1", now(), Duration::days(1));
        let mut returned = Loan::new("user-2", "book-1", now(), Duration::days(1));
        returned.status = LoanStatus::Returned { at: now() };

        loans.create(&active).unwrap();
        loans.create(&returned).unwrap();

        let found = loans.find_active().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, active.id);
    }

    #[test]
    fn test_find_active_by_user() {
        let (storage, _temp) = create_test_storage();
        let loans = LoanStore::new(&storage);

        loans
            .create(&Loan::new("user-1", "book-1", now(), Duration::days(1)))
            .unwrap();
        loans
            .create(&Loan::new("user-1", "book-2", now(), Duration::days(1)))
            .unwrap();
        loans
            .create(&Loan::new("user-2", "book-3", now(), Duration::days(1)))
            .unwrap();

        let mine = loans.find_active_by_user("user-1").unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|l| l.user_id == "user-1"));
    }

    #[test]
    fn test_find_history_by_book_includes_returned() {
        let (storage, _temp) = create_test_storage();
        let loans = LoanStore::new(&storage);

        let mut past = Loan::new("user-1", "book-1", now(), Duration::days(1));
        past.status = LoanStatus::Returned { at: now() };
        let current = Loan::new("user-2", "book-1", now(), Duration::days(1));

        loans.create(&past).unwrap();
        loans.create(&current).unwrap();
        loans
            .create(&Loan::new("user-3", "book-2", now(), Duration::days(1)))
            .unwrap();

        let history = loans.find_history_by_book("book-1").unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_find_due_by_sorted_and_bounded() {
        let (storage, _temp) = create_test_storage();
        let loans = LoanStore::new(&storage);

        let later = Loan::new("user-1", "book-1", now(), Duration::hours(20));
        let sooner = Loan::new("user-2", "book-2", now(), Duration::hours(2));
        let far = Loan::new("user-3", "book-3", now(), Duration::hours(48));

        loans.create(&later).unwrap();
        loans.create(&sooner).unwrap();
        loans.create(&far).unwrap();

        let due = loans.find_due_by(now() + Duration::hours(24)).unwrap();
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].id, sooner.id);
        assert_eq!(due[1].id, later.id);
    }
}
