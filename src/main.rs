use chrono::Duration;
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;
mod config;

use circulate::clock::{Clock, SystemClock};
use circulate::domain::{Book, Loan, User};
use circulate::inventory::{Adjustment, InventoryLedger};
use circulate::lending::{Checkout, LoanService};
use circulate::reminder::{ReminderJob, ReminderJobConfig, ReminderScanner};
use circulate::storage::JsonlStorage;
use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("circulate")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("circulate.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

/// The wired-up services over one storage directory.
struct App {
    ledger: Arc<InventoryLedger<JsonlStorage>>,
    loans: LoanService<JsonlStorage>,
    storage: Arc<JsonlStorage>,
}

fn open_app(config: &Config) -> Result<App> {
    let storage = Arc::new(
        JsonlStorage::new(&config.storage.data_dir).context("Failed to open storage directory")?,
    );
    let ledger = Arc::new(InventoryLedger::new(storage.clone()));
    let loans = LoanService::new(storage.clone(), ledger.clone());
    Ok(App {
        ledger,
        loans,
        storage,
    })
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let app = open_app(config)?;
    let now = SystemClock.now();

    match &cli.command {
        Commands::AddBook {
            title,
            author,
            copies,
        } => {
            let book = app.ledger.create_book(title, author, *copies, now)?;
            println!("{} {}", "Book registered:".green(), book.id.cyan());
            print_book(&book);
        }
        Commands::UpdateBook {
            id,
            title,
            author,
            copies,
        } => handle_update_book(&app, id, title.as_deref(), author.as_deref(), *copies)?,
        Commands::Books => {
            for book in app.ledger.list_books()? {
                print_book(&book);
            }
        }
        Commands::AddUser { name, email } => {
            let user = app.loans.register_user(name, email, now)?;
            println!("{} {}", "User registered:".green(), user.id.cyan());
        }
        Commands::Users => {
            for user in app.loans.list_users()? {
                print_user(&user);
            }
        }
        Commands::Borrow {
            user_id,
            book_id,
            days,
        } => {
            let duration = Duration::days(days.unwrap_or(config.lending.loan_days));
            match app.loans.create_loan(user_id, book_id, now, duration)? {
                Checkout::Borrowed(loan) => {
                    println!("{} {}", "Loan created:".green(), loan.id.cyan());
                    println!("  due {}", loan.due_at);
                }
                Checkout::Unavailable => {
                    println!("{}", "Book is not available.".yellow());
                }
            }
        }
        Commands::Return { loan_id } => {
            let loan = app.loans.return_loan(loan_id, now)?;
            println!("{} {}", "Book returned:".green(), loan.book_id.cyan());
        }
        Commands::Loans { user, book } => handle_loans(&app, user.as_deref(), book.as_deref())?,
        Commands::Due { hours } => {
            let window = Duration::hours(hours.unwrap_or(config.reminder.window_hours));
            let scanner = ReminderScanner::new(app.storage.clone());
            let notices = scanner.notices(now, window)?;
            if notices.is_empty() {
                println!("No loans due within {}h.", window.num_hours());
            }
            for notice in notices {
                println!(
                    "{} {} <{}> — {} due {}",
                    "due:".yellow(),
                    notice.user_name,
                    notice.user_email,
                    notice.book_title.cyan(),
                    notice.due_at
                );
            }
        }
        Commands::Remind => run_reminder_daemon(&app, config)?,
    }

    Ok(())
}

fn handle_update_book(
    app: &App,
    id: &str,
    title: Option<&str>,
    author: Option<&str>,
    copies: Option<u32>,
) -> Result<()> {
    let now = SystemClock.now();
    let current = app.ledger.get_book(id)?;

    if title.is_some() || author.is_some() {
        app.ledger.update_details(
            id,
            title.unwrap_or(&current.title),
            author.unwrap_or(&current.author),
            now,
        )?;
    }

    if let Some(new_total) = copies {
        let adjustment = app.ledger.adjust_total_copies(id, new_total, now)?;
        if let Adjustment::Clamped(_) = adjustment {
            println!(
                "{}",
                "Warning: more copies are out on loan than the new total; availability clamped to 0."
                    .yellow()
            );
        }
        print_book(adjustment.book());
    } else {
        print_book(&app.ledger.get_book(id)?);
    }

    Ok(())
}

fn handle_loans(app: &App, user: Option<&str>, book: Option<&str>) -> Result<()> {
    let loans = match (user, book) {
        (Some(user_id), _) => app.loans.loans_for_user(user_id)?,
        (None, Some(book_id)) => app.loans.history_for_book(book_id)?,
        (None, None) => {
            eyre::bail!("Pass --user for active loans or --book for a book's history");
        }
    };

    for loan in loans {
        print_loan(&loan);
    }
    Ok(())
}

fn run_reminder_daemon(app: &App, config: &Config) -> Result<()> {
    let job_config = ReminderJobConfig {
        interval: std::time::Duration::from_secs(config.reminder.interval_secs),
        window: Duration::hours(config.reminder.window_hours),
    };
    println!(
        "{} scanning every {}s, window {}h",
        "Reminder job running:".green(),
        config.reminder.interval_secs,
        config.reminder.window_hours
    );

    let job = ReminderJob::new(app.storage.clone(), SystemClock, job_config);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    runtime.block_on(async {
        tokio::select! {
            _ = job.run() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Reminder job interrupted, shutting down");
            }
        }
    });

    Ok(())
}

fn print_book(book: &Book) {
    println!(
        "{}  {} by {}  ({}/{} available)",
        book.id.cyan(),
        book.title.bold(),
        book.author,
        book.available_copies,
        book.total_copies
    );
}

fn print_user(user: &User) {
    println!("{}  {} <{}>", user.id.cyan(), user.name.bold(), user.email);
}

fn print_loan(loan: &Loan) {
    let status = if loan.is_active() {
        format!("due {}", loan.due_at).yellow()
    } else {
        "returned".green()
    };
    println!(
        "{}  user {} book {}  {}",
        loan.id.cyan(),
        loan.user_id,
        loan.book_id,
        status
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging()?;

    let config = Config::load(cli.config.as_ref())?;

    run_application(&cli, &config)
}
