//! Circulate - a library circulation service
//!
//! Circulate tracks a book catalog with per-title copy counts, checks books
//! out to registered users and back in, and periodically scans for loans
//! approaching their due date. Copy-count consistency under concurrent
//! checkouts is the heart of the crate: all count mutation is serialized
//! per book by the inventory ledger.

pub mod clock;
pub mod domain;
pub mod error;
pub mod id;
pub mod inventory;
pub mod lending;
pub mod reminder;
pub mod storage;

pub use error::{CirculateError, Result};
