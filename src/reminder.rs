//! Due-date reminders.
//!
//! The scan itself is a pure, clock-parameterized query over loan records:
//! active loans falling due inside the window. It never mutates anything
//! and recomputes from storage on every invocation, so a loan returned a
//! moment before or after a tick is at worst off by one tick. Delivery and
//! "already notified" suppression belong to whatever consumes the notices.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;
use crate::domain::Loan;
use crate::error::Result;
use crate::storage::{BookStore, LoanStore, Storage, UserStore};

/// A reminder ready for delivery: the loan joined with its recipient and
/// book details.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderNotice {
    pub loan_id: String,
    pub user_name: String,
    pub user_email: String,
    pub book_title: String,
    pub due_at: DateTime<Utc>,
}

/// Read-only scanner over loan records.
pub struct ReminderScanner<S: Storage> {
    storage: Arc<S>,
}

impl<S: Storage> ReminderScanner<S> {
    /// Create a scanner over the given record store.
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// All active loans due on or before `now + window`, soonest first.
    pub fn scan(&self, now: DateTime<Utc>, window: Duration) -> Result<Vec<Loan>> {
        LoanStore::new(self.storage.as_ref()).find_due_by(now + window)
    }

    /// The scan joined with user and book details for delivery.
    ///
    /// A loan whose user or book record is missing is skipped with a
    /// warning rather than failing the whole batch.
    pub fn notices(&self, now: DateTime<Utc>, window: Duration) -> Result<Vec<ReminderNotice>> {
        let users = UserStore::new(self.storage.as_ref());
        let books = BookStore::new(self.storage.as_ref());

        let mut notices = Vec::new();
        for loan in self.scan(now, window)? {
            let user = users.get(&loan.user_id)?;
            let book = books.get(&loan.book_id)?;
            match (user, book) {
                (Some(user), Some(book)) => notices.push(ReminderNotice {
                    loan_id: loan.id,
                    user_name: user.name,
                    user_email: user.email,
                    book_title: book.title,
                    due_at: loan.due_at,
                }),
                _ => {
                    tracing::warn!(
                        loan_id = %loan.id,
                        "Skipping reminder for loan with missing user or book record"
                    );
                }
            }
        }
        Ok(notices)
    }
}

/// Cadence and window for the periodic reminder job.
#[derive(Debug, Clone)]
pub struct ReminderJobConfig {
    /// Interval between scans
    pub interval: StdDuration,
    /// How far ahead of the due date a loan qualifies for a reminder
    pub window: Duration,
}

impl Default for ReminderJobConfig {
    fn default() -> Self {
        Self {
            interval: StdDuration::from_secs(60),
            window: Duration::days(1),
        }
    }
}

/// Periodic job that runs the scan and logs one line per notice.
///
/// Delivery is mocked as a log line; a real mailer would consume the same
/// notices.
pub struct ReminderJob<S: Storage, C: Clock> {
    scanner: ReminderScanner<S>,
    clock: C,
    config: ReminderJobConfig,
}

impl<S: Storage, C: Clock> ReminderJob<S, C> {
    /// Create a job over the given store, clock, and cadence.
    pub fn new(storage: Arc<S>, clock: C, config: ReminderJobConfig) -> Self {
        Self {
            scanner: ReminderScanner::new(storage),
            clock,
            config,
        }
    }

    /// One scan pass. Always terminates; returns the notices it logged.
    pub fn run_once(&self) -> Result<Vec<ReminderNotice>> {
        let now = self.clock.now();
        let notices = self.scanner.notices(now, self.config.window)?;

        if notices.is_empty() {
            tracing::info!("No loans due within the reminder window");
        }
        for notice in &notices {
            tracing::info!(
                user_email = %notice.user_email,
                book_title = %notice.book_title,
                due_at = %notice.due_at,
                "Sending reminder email"
            );
        }

        Ok(notices)
    }

    /// Run scans on the configured interval until the task is dropped or
    /// the caller's select arm wins.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.config.interval);
        loop {
            interval.tick().await;
            if let Err(e) = self.run_once() {
                tracing::error!(error = %e, "Reminder scan failed");
            }
        }
    }
}
