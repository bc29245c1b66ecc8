//! Daily quota gate.
//!
//! [`QuotaGate<S>`] wraps any [`QuotaStore`] and applies the per-session
//! [`QuotaPolicy`]:
//! - Unlimited sessions never touch storage
//! - Metered sessions read today's row (created lazily) and consume through
//!   the store's atomic conditional increment

use mentob_core::{UNLIMITED_REMAINING, today_utc};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::policy::{QuotaPolicy, QuotaSnapshot, QuotaTotal, QuotaUse, Session};
use crate::traits::QuotaStore;

/// Source of the current `YYYY-MM-DD` quota day.
pub type DaySource = fn() -> String;

/// Quota checks and consumption over a [`QuotaStore`].
pub struct QuotaGate<S: QuotaStore> {
    store: S,
    today: DaySource,
}

impl<S: QuotaStore> QuotaGate<S> {
    /// Create a gate keyed on the current UTC day.
    pub fn new(store: S) -> Self {
        Self {
            store,
            today: today_utc,
        }
    }

    /// Override the day source (tests, replays).
    pub fn with_day_source(mut self, today: DaySource) -> Self {
        self.today = today;
        self
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The quota day currently in effect.
    #[inline]
    pub fn today(&self) -> String {
        (self.today)()
    }

    /// Remaining readings for today.
    pub async fn remaining(&self, session: &Session) -> Result<u32, StoreError> {
        match session.policy {
            QuotaPolicy::Unlimited => Ok(UNLIMITED_REMAINING),
            QuotaPolicy::Metered(limit) => {
                let record = self
                    .store
                    .get_or_create(&session.user_id, &self.today())
                    .await?;
                Ok(limit.saturating_sub(record.count))
            }
        }
    }

    /// Whether the session may start another reading.
    pub async fn can_interpret(&self, session: &Session) -> Result<bool, StoreError> {
        Ok(self.remaining(session).await? > 0)
    }

    /// Consume one reading.
    ///
    /// Fails without mutating anything when the limit is already reached.
    pub async fn use_quota(&self, session: &Session) -> Result<QuotaUse, StoreError> {
        let limit = match session.policy {
            QuotaPolicy::Unlimited => {
                return Ok(QuotaUse {
                    success: true,
                    remaining: UNLIMITED_REMAINING,
                });
            }
            QuotaPolicy::Metered(limit) => limit,
        };

        let today = self.today();
        // The conditional increment needs the row to exist.
        self.store.get_or_create(&session.user_id, &today).await?;

        match self
            .store
            .increment_within(&session.user_id, &today, limit)
            .await?
        {
            Some(record) => {
                let remaining = limit.saturating_sub(record.count);
                debug!(user = %session.user_id, used = record.count, remaining, "quota consumed");
                Ok(QuotaUse {
                    success: true,
                    remaining,
                })
            }
            None => {
                warn!(user = %session.user_id, limit, "quota exhausted");
                Ok(QuotaUse {
                    success: false,
                    remaining: 0,
                })
            }
        }
    }

    /// Summary for the quota endpoint.
    pub async fn snapshot(&self, session: &Session) -> Result<QuotaSnapshot, StoreError> {
        match session.policy {
            QuotaPolicy::Unlimited => Ok(QuotaSnapshot {
                remaining: UNLIMITED_REMAINING,
                used: 0,
                total: QuotaTotal::Unlimited,
                is_demo: true,
            }),
            QuotaPolicy::Metered(limit) => {
                let record = self
                    .store
                    .get_or_create(&session.user_id, &self.today())
                    .await?;
                Ok(QuotaSnapshot {
                    remaining: limit.saturating_sub(record.count),
                    used: record.count,
                    total: QuotaTotal::Limited(limit),
                    is_demo: false,
                })
            }
        }
    }
}
