//! SQL storage backend.
//!
//! This module stores quota counters and readings in SQL databases
//! (PostgreSQL, MySQL, SQLite) through the SQLx `Any` driver.
//!
//! # Features
//!
//! Enable one or more database features in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! mentob-store = { version = "0.1", features = ["sql-postgres"] }
//! # or
//! mentob-store = { version = "0.1", features = ["sql-mysql"] }
//! # or
//! mentob-store = { version = "0.1", features = ["sql-sqlite"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mentob_store::sql::{SqlStore, SqlStoreConfig};
//!
//! let store = SqlStore::connect(
//!     SqlStoreConfig::new("sqlite:mentob.db").auto_migrate(true)
//! ).await?;
//! ```
//!
//! # Database Schema
//!
//! [`SqlStore::migrate`] creates (PostgreSQL shown):
//!
//! ```sql
//! CREATE TABLE daily_quotas (
//!     user_id VARCHAR(255) NOT NULL,
//!     quota_date VARCHAR(10) NOT NULL,   -- YYYY-MM-DD, UTC
//!     used_count BIGINT NOT NULL DEFAULT 0,
//!     created_at BIGINT NOT NULL,        -- unix millis
//!     updated_at BIGINT NOT NULL,
//!     PRIMARY KEY (user_id, quota_date)
//! );
//!
//! CREATE TABLE tarot_interpretations (
//!     id VARCHAR(36) PRIMARY KEY,        -- UUID v4
//!     user_id VARCHAR(255) NOT NULL,
//!     question TEXT NOT NULL,
//!     spread_type VARCHAR(50) NOT NULL,
//!     cards TEXT NOT NULL,               -- JSON array
//!     interpretation TEXT NOT NULL,
//!     created_at BIGINT NOT NULL
//! );
//! ```

mod backend;
mod config;
mod queries;

#[cfg(test)]
mod tests;

pub use backend::{DatabaseType, SqlStore};
pub use config::SqlStoreConfig;
