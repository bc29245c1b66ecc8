//! Core types and constants shared across mentob crates.
//!
//! This crate provides:
//! - Default configuration values
//! - Error kind constants for metrics/logging
//! - The built-in tarot deck and spread catalog
//! - Calendar-day helpers used for quota accounting

pub mod day;
pub mod defaults;
pub mod errors;
pub mod tarot;

// Re-export commonly used items at crate root
pub use day::{today_utc, utc_day};
pub use defaults::*;
pub use errors::*;
pub use tarot::{Card, DrawnCard, Spread, SpreadPosition};

/// Project name.
pub const PROJECT_NAME: &str = "mentob";
/// Project version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
