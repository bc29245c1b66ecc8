//! Mentob server library.
//!
//! HTTP service that streams LLM tarot readings behind a per-user daily
//! quota, plus the read paths (quota, history, share links), follow-up
//! generation and the billing proxy. Exposed as a library for the unified
//! CLI and the integration tests.

mod billing;
pub mod cli;
mod error;
mod followup;
mod interpret;
mod routes;
mod server;
mod state;

pub use billing::{BillingClient, BillingError, CheckoutRequest, CheckoutSession};
pub use cli::ServerArgs;
pub use error::{ApiError, ApiResponse, ErrorCode, ServerError};
pub use interpret::{InterpretRequest, Phase, Reading, SpreadInput};
pub use server::{
    DEFAULT_SHUTDOWN_TIMEOUT, build_llm, build_store, router, run, run_with_shutdown, serve,
};
pub use state::AppState;
pub use tokio_util::sync::CancellationToken;
