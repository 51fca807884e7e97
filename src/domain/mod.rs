//! Domain records: books, users, and loans.
//!
//! These are the persistent record types. All copy-count mutation goes
//! through the inventory ledger and all loan-state mutation goes through
//! the lending service; nothing else writes these records.

pub mod book;
pub mod loan;
pub mod user;

pub use book::Book;
pub use loan::{Loan, LoanStatus};
pub use user::User;
