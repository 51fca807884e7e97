//! Loan lifecycle: checkout and return, coordinated with the inventory
//! ledger.
//!
//! The reservation and the loan write are two separate storage operations,
//! so each path carries explicit compensation: a checkout that fails to
//! persist its loan releases the reserved copy, and a return whose release
//! fails rolls the loan back to active so a retry can release it. Without
//! the first, a copy would be lost forever; without the second, a copy
//! would stay off the shelf with no active loan holding it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::domain::{Loan, LoanStatus, User};
use crate::error::{CirculateError, Result};
use crate::inventory::{InventoryLedger, Reservation};
use crate::storage::{LoanStore, Storage, UserStore};

/// Outcome of a checkout attempt. Like `Reservation`, `Unavailable` is a
/// decision the caller branches on, distinct from "book does not exist".
#[derive(Debug, Clone, PartialEq)]
pub enum Checkout {
    /// The loan was created and a copy reserved.
    Borrowed(Loan),
    /// The book exists but has no copies on the shelf.
    Unavailable,
}

/// Coordinates the loan state machine with copy reservations.
///
/// Returns of the same loan are serialized by a per-loan mutex, the same
/// keyed-lock idiom the ledger uses per book, so the already-returned check
/// and the state transition are atomic with respect to each other.
pub struct LoanService<S: Storage> {
    storage: Arc<S>,
    ledger: Arc<InventoryLedger<S>>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: Storage> LoanService<S> {
    /// Create a loan service sharing the given store and ledger.
    pub fn new(storage: Arc<S>, ledger: Arc<InventoryLedger<S>>) -> Self {
        Self {
            storage,
            ledger,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create the mutex serializing returns of one loan.
    fn loan_lock(&self, loan_id: &str) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|e| CirculateError::Storage(e.to_string()))?;
        Ok(locks
            .entry(loan_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    /// Register a new library member.
    pub fn register_user(&self, name: &str, email: &str, now: DateTime<Utc>) -> Result<User> {
        let user = User::new(name, email, now);
        UserStore::new(self.storage.as_ref()).create(&user)?;
        Ok(user)
    }

    /// Fetch a user, erroring if they do not exist.
    pub fn get_user(&self, user_id: &str) -> Result<User> {
        UserStore::new(self.storage.as_ref())
            .get(user_id)?
            .ok_or_else(|| CirculateError::UserNotFound(user_id.to_string()))
    }

    /// List all registered users.
    pub fn list_users(&self) -> Result<Vec<User>> {
        UserStore::new(self.storage.as_ref()).list_all()
    }

    /// Check a book out to a user.
    ///
    /// Order matters: the user is checked first, then the reservation
    /// settles "missing book" vs "no copies" — the two surface differently
    /// (`BookNotFound` error vs `Checkout::Unavailable` outcome).
    pub fn create_loan(
        &self,
        user_id: &str,
        book_id: &str,
        now: DateTime<Utc>,
        duration: Duration,
    ) -> Result<Checkout> {
        if UserStore::new(self.storage.as_ref()).get(user_id)?.is_none() {
            return Err(CirculateError::UserNotFound(user_id.to_string()));
        }

        match self.ledger.reserve_copy(book_id, now)? {
            Reservation::Unavailable => Ok(Checkout::Unavailable),
            Reservation::Reserved(_) => {
                let loan = Loan::new(user_id, book_id, now, duration);

                if let Err(e) = LoanStore::new(self.storage.as_ref()).create(&loan) {
                    // Compensating release: the reservation must not outlive
                    // a loan that was never recorded.
                    if let Err(release_err) = self.ledger.release_copy(book_id, now) {
                        log::error!(
                            "Failed to release copy of {} after loan persist failure: {}",
                            book_id,
                            release_err
                        );
                    }
                    return Err(e);
                }

                log::info!(
                    "Loan {} created: user {} borrowed {} until {}",
                    loan.id,
                    loan.user_id,
                    loan.book_id,
                    loan.due_at
                );
                Ok(Checkout::Borrowed(loan))
            }
        }
    }

    /// Return a borrowed book.
    ///
    /// A second return of the same loan fails with `AlreadyReturned` and
    /// never reaches the ledger, so availability is incremented exactly
    /// once per loan. The read, the check, and the transition all happen
    /// under the loan's lock; two racing returns resolve to one `Ok` and
    /// one `AlreadyReturned`.
    pub fn return_loan(&self, loan_id: &str, now: DateTime<Utc>) -> Result<Loan> {
        let lock = self.loan_lock(loan_id)?;
        let _guard = lock
            .lock()
            .map_err(|e| CirculateError::Storage(e.to_string()))?;

        let loans = LoanStore::new(self.storage.as_ref());
        let previous = loans
            .get(loan_id)?
            .ok_or_else(|| CirculateError::LoanNotFound(loan_id.to_string()))?;

        if !previous.is_active() {
            return Err(CirculateError::AlreadyReturned(loan_id.to_string()));
        }

        let mut loan = previous.clone();
        loan.status = LoanStatus::Returned { at: now };
        loans.update(&loan)?;

        if let Err(e) = self.ledger.release_copy(&loan.book_id, now) {
            // Roll the loan back so a retry can release the copy.
            if let Err(rollback_err) = loans.update(&previous) {
                log::error!(
                    "Failed to roll back loan {} after release failure: {}",
                    previous.id,
                    rollback_err
                );
            }
            return Err(e);
        }

        log::info!("Loan {} returned: {} back on the shelf", loan.id, loan.book_id);
        Ok(loan)
    }

    /// Fetch a loan, erroring if it does not exist.
    pub fn get_loan(&self, loan_id: &str) -> Result<Loan> {
        LoanStore::new(self.storage.as_ref())
            .get(loan_id)?
            .ok_or_else(|| CirculateError::LoanNotFound(loan_id.to_string()))
    }

    /// Unreturned loans held by a user.
    pub fn loans_for_user(&self, user_id: &str) -> Result<Vec<Loan>> {
        LoanStore::new(self.storage.as_ref()).find_active_by_user(user_id)
    }

    /// Full lending history of a book, returned loans included.
    pub fn history_for_book(&self, book_id: &str) -> Result<Vec<Loan>> {
        LoanStore::new(self.storage.as_ref()).find_history_by_book(book_id)
    }
}
