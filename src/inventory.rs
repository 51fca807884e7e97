//! Inventory ledger: the one owner of a book's copy counts.
//!
//! Every mutation of `(total_copies, available_copies)` goes through the
//! ledger, and mutations on the same book are serialized by a per-book
//! mutex. Two concurrent reservations on a book with one copy left
//! therefore resolve to exactly one `Reserved` and one `Unavailable`; the
//! counts can never over-commit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::domain::Book;
use crate::error::{CirculateError, Result};
use crate::storage::{BookStore, Storage};

/// Outcome of a reservation attempt. `Unavailable` is a normal decision
/// outcome, not an error; callers branch on it.
#[derive(Debug, Clone, PartialEq)]
pub enum Reservation {
    /// A copy was set aside; the book reflects the decremented count.
    Reserved(Book),
    /// No copies on the shelf.
    Unavailable,
}

/// Outcome of a total-copies adjustment.
#[derive(Debug, Clone, PartialEq)]
pub enum Adjustment {
    /// The new total left room for every copy currently out.
    Adjusted(Book),
    /// The new total is below the number of copies out; availability was
    /// clamped to zero instead of going negative.
    Clamped(Book),
}

impl Adjustment {
    /// The adjusted book, whichever way the adjustment went.
    pub fn book(&self) -> &Book {
        match self {
            Adjustment::Adjusted(book) | Adjustment::Clamped(book) => book,
        }
    }
}

/// Owns the copy-count invariant `0 <= available_copies <= total_copies`.
pub struct InventoryLedger<S: Storage> {
    storage: Arc<S>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S: Storage> InventoryLedger<S> {
    /// Create a ledger over the given record store.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Register a new book; it starts fully available.
    pub fn create_book(
        &self,
        title: &str,
        author: &str,
        total_copies: u32,
        now: DateTime<Utc>,
    ) -> Result<Book> {
        let book = Book::new(title, author, total_copies, now)?;
        BookStore::new(self.storage.as_ref()).create(&book)?;
        Ok(book)
    }

    /// Fetch a book, erroring if it does not exist.
    pub fn get_book(&self, book_id: &str) -> Result<Book> {
        BookStore::new(self.storage.as_ref())
            .get(book_id)?
            .ok_or_else(|| CirculateError::BookNotFound(book_id.to_string()))
    }

    /// List the whole catalog.
    pub fn list_books(&self) -> Result<Vec<Book>> {
        BookStore::new(self.storage.as_ref()).list_all()
    }

    /// Atomically take one copy off the shelf.
    pub fn reserve_copy(&self, book_id: &str, now: DateTime<Utc>) -> Result<Reservation> {
        self.with_book(book_id, |book| {
            if book.available_copies == 0 {
                return (false, Reservation::Unavailable);
            }
            book.available_copies -= 1;
            book.touch(now);
            (true, Reservation::Reserved(book.clone()))
        })
    }

    /// Atomically put one copy back on the shelf.
    ///
    /// Clamped at `total_copies` so a release that was never paired with a
    /// reservation cannot push availability past what the library owns.
    pub fn release_copy(&self, book_id: &str, now: DateTime<Utc>) -> Result<Book> {
        self.with_book(book_id, |book| {
            if book.available_copies >= book.total_copies {
                log::warn!("Unpaired release for {}: already fully available", book.id);
                return (false, book.clone());
            }
            book.available_copies += 1;
            book.touch(now);
            (true, book.clone())
        })
    }

    /// Change how many copies the library owns.
    ///
    /// Copies currently out stay out; the new availability is whatever is
    /// left after them, floored at zero. A total below the number of
    /// copies out succeeds but reports `Clamped`.
    pub fn adjust_total_copies(
        &self,
        book_id: &str,
        new_total: u32,
        now: DateTime<Utc>,
    ) -> Result<Adjustment> {
        self.with_book(book_id, |book| {
            let on_loan = book.on_loan();
            book.total_copies = new_total;
            book.available_copies = new_total.saturating_sub(on_loan);
            book.touch(now);

            if new_total < on_loan {
                (true, Adjustment::Clamped(book.clone()))
            } else {
                (true, Adjustment::Adjusted(book.clone()))
            }
        })
    }

    /// Update a book's title and author without touching the counts.
    pub fn update_details(
        &self,
        book_id: &str,
        title: &str,
        author: &str,
        now: DateTime<Utc>,
    ) -> Result<Book> {
        self.with_book(book_id, |book| {
            book.title = title.to_string();
            book.author = author.to_string();
            book.touch(now);
            (true, book.clone())
        })
    }

    /// Get or create the mutex serializing mutations of one book.
    fn book_lock(&self, book_id: &str) -> Result<Arc<Mutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|e| CirculateError::Storage(e.to_string()))?;
        Ok(locks
            .entry(book_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }

    /// Read-modify-write one book under its lock. The closure returns
    /// whether the record changed and the value to hand back; the record is
    /// persisted only when it changed.
    fn with_book<R>(
        &self,
        book_id: &str,
        mutate: impl FnOnce(&mut Book) -> (bool, R),
    ) -> Result<R> {
        let lock = self.book_lock(book_id)?;
        let _guard = lock
            .lock()
            .map_err(|e| CirculateError::Storage(e.to_string()))?;

        let store = BookStore::new(self.storage.as_ref());
        let mut book = store
            .get(book_id)?
            .ok_or_else(|| CirculateError::BookNotFound(book_id.to_string()))?;

        let (changed, result) = mutate(&mut book);
        if changed {
            debug_assert!(book.available_copies <= book.total_copies);
            store.update(&book)?;
        }
        Ok(result)
    }
}
