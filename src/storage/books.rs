//! Book-collection storage helpers.

use super::traits::{HasId, Storage};
use crate::domain::Book;
use crate::error::Result;

/// Collection name for books.
pub const BOOKS_COLLECTION: &str = "books";

impl HasId for Book {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Helper for book-specific storage access.
pub struct BookStore<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> BookStore<'a, S> {
    /// Create a new BookStore wrapping the given storage.
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Get a book by ID.
    pub fn get(&self, id: &str) -> Result<Option<Book>> {
        self.storage.get(BOOKS_COLLECTION, id)
    }

    /// Register a new book.
    pub fn create(&self, book: &Book) -> Result<()> {
        self.storage.create(BOOKS_COLLECTION, book)
    }

    /// Update an existing book.
    pub fn update(&self, book: &Book) -> Result<()> {
        self.storage.update(BOOKS_COLLECTION, book)
    }

    /// List the whole catalog.
    pub fn list_all(&self) -> Result<Vec<Book>> {
        self.storage.list(BOOKS_COLLECTION)
    }
}
