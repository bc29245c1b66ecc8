//! Configuration loading and CLI definitions.
//!
//! Every section has defaults, so an empty file (or no file at all) yields a
//! runnable configuration. Command-line overrides are applied on top of the
//! loaded file and the result is checked with [`validate_config`].

mod cli;
mod defaults;
mod loader;
mod types;
mod validate;

#[cfg(test)]
mod tests;

pub use cli::{CliOverrides, apply_overrides};
pub use loader::{ConfigError, ConfigFormat, load_config, parse_config};
pub use types::*;
pub use validate::validate_config;
