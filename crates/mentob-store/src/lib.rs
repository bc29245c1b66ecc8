//! Storage and quota accounting for mentob.
//!
//! This crate provides the quota and interpretation stores, the daily
//! [`QuotaGate`], and an operator CLI for SQL deployments.
//!
//! # Example
//!
//! ```
//! use mentob_store::{MemoryStore, PolicyResolver, QuotaGate};
//!
//! # async fn example() -> Result<(), mentob_store::StoreError> {
//! let gate = QuotaGate::new(MemoryStore::new());
//! let session = PolicyResolver::default().resolve("alice");
//!
//! assert_eq!(gate.remaining(&session).await?, 3);
//! let used = gate.use_quota(&session).await?;
//! assert!(used.success);
//! # Ok(())
//! # }
//! ```

mod error;
mod gate;
mod memory;
mod policy;
mod record;
mod traits;

#[cfg(feature = "sql")]
pub mod cli;
#[cfg(feature = "sql")]
pub mod sql;

pub use error::StoreError;
pub use gate::{DaySource, QuotaGate};
pub use memory::MemoryStore;
pub use policy::{PolicyResolver, QuotaPolicy, QuotaSnapshot, QuotaTotal, QuotaUse, Session};
pub use record::{InterpretationRecord, NewInterpretation, QuotaRecord};
pub use traits::{InterpretationStore, QuotaStore, Store};

#[cfg(feature = "sql")]
pub use cli::{StoreArgs, StoreCommands};
