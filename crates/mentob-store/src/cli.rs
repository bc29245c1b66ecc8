//! CLI module for mentob-store.
//!
//! Operator commands for the SQL store: schema setup, quota inspection and
//! correction, and reading history. Used both as the standalone
//! `mentob-store` binary and as `mentob store ...`.
//!
//! # Usage
//!
//! ```bash
//! # Initialize database schema
//! mentob-store init -d sqlite:mentob.db
//!
//! # Show today's quota for a user
//! mentob-store quota -d sqlite:mentob.db -u alice
//!
//! # Give a user their day back
//! mentob-store reset-quota -d sqlite:mentob.db -u alice --date 2026-03-01
//!
//! # Recent readings
//! mentob-store history -d sqlite:mentob.db -u alice -n 10
//!
//! # Replace a stored interpretation
//! mentob-store correct -d sqlite:mentob.db --id <uuid> --text "..."
//! ```

use clap::{Parser, Subcommand};
use mentob_core::{DEFAULT_FREE_DAILY_QUOTA, DEFAULT_HISTORY_PAGE, today_utc};
use tabled::{Table, Tabled};

use crate::record::InterpretationRecord;
use crate::sql::{SqlStore, SqlStoreConfig};
use crate::traits::{InterpretationStore, QuotaStore};

/// Store management CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "mentob-store",
    version,
    about = "Manage mentob quotas and stored readings"
)]
pub struct StoreArgs {
    #[command(subcommand)]
    pub command: StoreCommands,
}

/// Store CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum StoreCommands {
    /// Initialize database schema.
    Init {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,
    },

    /// Show a user's quota for a day.
    Quota {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User ID.
        #[arg(short, long)]
        user_id: String,

        /// Day (YYYY-MM-DD, UTC). Defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Daily limit used to compute the remaining count.
        #[arg(short, long, default_value_t = DEFAULT_FREE_DAILY_QUOTA)]
        limit: u32,
    },

    /// Reset a user's quota counter for a day.
    ResetQuota {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User ID.
        #[arg(short, long)]
        user_id: String,

        /// Day (YYYY-MM-DD, UTC). Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// List a user's readings, newest first.
    History {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User ID.
        #[arg(short, long)]
        user_id: String,

        /// Maximum number of readings.
        #[arg(short = 'n', long, default_value_t = DEFAULT_HISTORY_PAGE)]
        limit: usize,

        /// Output format (table, json).
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Print a single reading as JSON.
    Show {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Reading ID.
        #[arg(long)]
        id: String,
    },

    /// Replace the interpretation text of a stored reading.
    Correct {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Reading ID.
        #[arg(long)]
        id: String,

        /// New interpretation text.
        #[arg(long, group = "source")]
        text: Option<String>,

        /// Read the new interpretation text from a file.
        #[arg(long, group = "source")]
        file: Option<std::path::PathBuf>,
    },
}

/// Reading row for display.
#[derive(Tabled)]
struct ReadingDisplay {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Created")]
    created_at: String,
    #[tabled(rename = "Spread")]
    spread_type: String,
    #[tabled(rename = "Cards")]
    cards: usize,
    #[tabled(rename = "Question")]
    question: String,
}

impl From<&InterpretationRecord> for ReadingDisplay {
    fn from(record: &InterpretationRecord) -> Self {
        Self {
            id: record.id.clone(),
            created_at: record.created_at.to_string(),
            spread_type: record.spread_type.clone(),
            cards: record.cards.len(),
            question: truncate(&record.question, 40),
        }
    }
}

/// Quota row for display.
#[derive(Tabled)]
struct QuotaDisplay {
    #[tabled(rename = "User ID")]
    user_id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Used")]
    used: u32,
    #[tabled(rename = "Remaining")]
    remaining: u32,
    #[tabled(rename = "Readings Stored")]
    stored: u64,
}

/// Run the store CLI with the given arguments.
///
/// This is the main entry point for the store CLI, used by both the
/// standalone binary and the unified mentob CLI.
pub async fn run(args: StoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        StoreCommands::Init { database } => init_database(&database).await,
        StoreCommands::Quota {
            database,
            user_id,
            date,
            limit,
        } => show_quota(&database, &user_id, date, limit).await,
        StoreCommands::ResetQuota {
            database,
            user_id,
            date,
        } => reset_quota(&database, &user_id, date).await,
        StoreCommands::History {
            database,
            user_id,
            limit,
            format,
        } => list_history(&database, &user_id, limit, &format).await,
        StoreCommands::Show { database, id } => show_reading(&database, &id).await,
        StoreCommands::Correct {
            database,
            id,
            text,
            file,
        } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(path)?,
                (None, None) => return Err("Must specify --text or --file".into()),
            };
            correct_reading(&database, &id, &text).await
        }
    }
}

/// Connect to database.
async fn connect(url: &str) -> Result<SqlStore, Box<dyn std::error::Error>> {
    let store = SqlStore::connect(SqlStoreConfig::new(url).max_connections(1)).await?;
    Ok(store)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Initialize database schema.
async fn init_database(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = connect(url).await?;
    store.migrate().await?;
    println!("Database schema initialized successfully.");
    Ok(())
}

/// Show a day's quota.
async fn show_quota(
    url: &str,
    user_id: &str,
    date: Option<String>,
    limit: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = connect(url).await?;
    let date = date.unwrap_or_else(today_utc);

    let used = store
        .find(user_id, &date)
        .await?
        .map(|r| r.count)
        .unwrap_or(0);
    let stored = store.count_on_day(user_id, &date).await?;

    let row = QuotaDisplay {
        user_id: user_id.to_string(),
        date,
        used,
        remaining: limit.saturating_sub(used),
        stored,
    };
    println!("{}", Table::new([row]));
    Ok(())
}

/// Reset a day's quota.
async fn reset_quota(
    url: &str,
    user_id: &str,
    date: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = connect(url).await?;
    let date = date.unwrap_or_else(today_utc);

    if store.reset(user_id, &date).await? {
        println!("Quota reset for {} on {}.", user_id, date);
    } else {
        println!("No quota record for {} on {}.", user_id, date);
    }
    Ok(())
}

/// List readings.
async fn list_history(
    url: &str,
    user_id: &str,
    limit: usize,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = connect(url).await?;
    let records = store.list_by_user(user_id, limit).await?;

    if records.is_empty() {
        println!("No readings found.");
        return Ok(());
    }

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&records)?),
        _ => {
            let rows: Vec<ReadingDisplay> = records.iter().map(ReadingDisplay::from).collect();
            println!("{}", Table::new(rows));
        }
    }
    Ok(())
}

/// Print one reading.
async fn show_reading(url: &str, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = connect(url).await?;
    match store.get(id).await? {
        Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        None => println!("No reading found with id: {}", id),
    }
    Ok(())
}

/// Replace a reading's interpretation.
async fn correct_reading(url: &str, id: &str, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = connect(url).await?;
    if store.update_interpretation(id, text).await? {
        println!("Reading updated successfully.");
    } else {
        println!("No reading found with id: {}", id);
    }
    Ok(())
}
