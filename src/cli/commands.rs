//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - add-book / update-book / books: catalog management
//! - add-user / users: membership
//! - borrow / return / loans: the loan lifecycle
//! - due / remind: due-date reminders (one-shot and daemon)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Circulate - library circulation: inventory, loans, due-date reminders
#[derive(Parser, Debug)]
#[command(name = "circulate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a new book
    AddBook {
        /// Book title
        title: String,

        /// Book author
        author: String,

        /// Number of copies the library owns
        #[arg(short = 'n', long, default_value_t = 1)]
        copies: u32,
    },

    /// Update a book's details and copy count
    UpdateBook {
        /// Book ID to update
        id: String,

        /// New title
        #[arg(short, long)]
        title: Option<String>,

        /// New author
        #[arg(short, long)]
        author: Option<String>,

        /// New total copy count
        #[arg(short = 'n', long)]
        copies: Option<u32>,
    },

    /// List the catalog
    Books,

    /// Register a new user
    AddUser {
        /// Full name
        name: String,

        /// Email address for reminders
        email: String,
    },

    /// List registered users
    Users,

    /// Check a book out to a user
    Borrow {
        /// Borrowing user's ID
        user_id: String,

        /// Book ID to borrow
        book_id: String,

        /// Loan period in days (defaults to the configured period)
        #[arg(short, long)]
        days: Option<i64>,
    },

    /// Return a borrowed book
    Return {
        /// Loan ID to return
        loan_id: String,
    },

    /// Show loans
    Loans {
        /// Only active loans of this user
        #[arg(short, long)]
        user: Option<String>,

        /// Full history of this book
        #[arg(short, long)]
        book: Option<String>,
    },

    /// One-shot scan for loans approaching their due date
    Due {
        /// Reminder window in hours (defaults to the configured window)
        #[arg(long)]
        hours: Option<i64>,
    },

    /// Run the periodic reminder job in the foreground
    Remind,
}
