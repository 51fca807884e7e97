//! Persistence layer: a generic record store plus typed per-collection
//! helpers for books, users, and loans.

pub mod books;
pub mod jsonl;
pub mod loans;
pub mod traits;
pub mod users;

pub use books::{BOOKS_COLLECTION, BookStore};
pub use jsonl::JsonlStorage;
pub use loans::{LOANS_COLLECTION, LoanStore};
pub use traits::{Filter, FilterOp, HasId, Storage};
pub use users::{USERS_COLLECTION, UserStore};
