//! Application state shared across requests.

use std::sync::Arc;
use std::time::Duration;

use mentob_config::{Config, LimitsConfig};
use mentob_llm::LlmClient;
use mentob_store::{DaySource, PolicyResolver, QuotaGate, Session, Store};

use crate::billing::BillingClient;
use crate::error::ServerError;

/// Shared state handed to every handler.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub gate: QuotaGate<Arc<dyn Store>>,
    pub llm: Arc<dyn LlmClient>,
    pub policies: PolicyResolver,
    pub limits: LimitsConfig,
    pub system_prompt: String,
    pub followup_timeout: Duration,
    pub billing: BillingClient,
}

impl AppState {
    /// Assemble the state from a validated config and already-built backends.
    pub fn new(
        config: &Config,
        store: Arc<dyn Store>,
        llm: Arc<dyn LlmClient>,
    ) -> Result<Self, ServerError> {
        let policies = PolicyResolver::new(
            config.quota.free_daily,
            config.demo.account().map(str::to_string),
        );
        Ok(Self {
            gate: QuotaGate::new(store.clone()),
            store,
            llm,
            policies,
            limits: config.limits.clone(),
            system_prompt: config.llm.system_prompt.clone(),
            followup_timeout: Duration::from_secs(config.llm.followup_timeout_secs),
            billing: BillingClient::new(&config.billing)?,
        })
    }

    /// Key quota rows on a different day source.
    pub fn with_day_source(mut self, today: DaySource) -> Self {
        self.gate = self.gate.with_day_source(today);
        self
    }

    /// Resolve the caller of a request from the user id it names.
    pub fn session(&self, user_id: &str) -> Session {
        self.policies.resolve(user_id)
    }
}
