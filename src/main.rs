//! Unified mentob CLI.
//!
//! - `mentob server` - Run the HTTP service
//! - `mentob store` - Inspect and repair quota and reading records (SQL backend)

use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// mentob unified CLI.
#[derive(Parser)]
#[command(
    name = "mentob",
    version,
    about = "AI tarot readings with daily quotas",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service.
    #[command(name = "server", alias = "serve")]
    Server(Box<mentob_server::ServerArgs>),

    /// Inspect and repair stored quota and readings.
    #[command(name = "store")]
    Store(mentob_store::StoreArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Server(args) => mentob_server::cli::run(*args).await,
        Commands::Store(args) => mentob_store::cli::run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
