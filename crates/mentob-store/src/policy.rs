//! Quota policy and per-request sessions.

use mentob_core::{DEFAULT_DEMO_USER_ID, DEFAULT_FREE_DAILY_QUOTA};
use serde::{Serialize, Serializer};

/// How a user's readings are counted.
///
/// Decided once per request by [`PolicyResolver`]; the gate never
/// re-derives it from the user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaPolicy {
    /// At most `limit` readings per UTC day.
    Metered(u32),
    /// No limit and no counter mutation.
    Unlimited,
}

impl QuotaPolicy {
    #[inline]
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

/// The caller of a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub policy: QuotaPolicy,
}

impl Session {
    /// Session with an explicit policy.
    pub fn new(user_id: impl Into<String>, policy: QuotaPolicy) -> Self {
        Self {
            user_id: user_id.into(),
            policy,
        }
    }
}

/// Maps user ids to quota policies.
#[derive(Debug, Clone)]
pub struct PolicyResolver {
    free_daily_quota: u32,
    demo_user_id: Option<String>,
}

impl Default for PolicyResolver {
    fn default() -> Self {
        Self {
            free_daily_quota: DEFAULT_FREE_DAILY_QUOTA,
            demo_user_id: Some(DEFAULT_DEMO_USER_ID.to_string()),
        }
    }
}

impl PolicyResolver {
    /// Create a resolver. `demo_user_id = None` disables the demo account.
    pub fn new(free_daily_quota: u32, demo_user_id: Option<String>) -> Self {
        Self {
            free_daily_quota,
            demo_user_id,
        }
    }

    /// The daily limit applied to metered users.
    #[inline]
    pub fn free_daily_quota(&self) -> u32 {
        self.free_daily_quota
    }

    /// Whether `user_id` is the configured demo account.
    #[inline]
    pub fn is_demo(&self, user_id: &str) -> bool {
        self.demo_user_id.as_deref() == Some(user_id)
    }

    /// Policy for a user id.
    pub fn policy_for(&self, user_id: &str) -> QuotaPolicy {
        if self.is_demo(user_id) {
            QuotaPolicy::Unlimited
        } else {
            QuotaPolicy::Metered(self.free_daily_quota)
        }
    }

    /// Resolve a request's caller into a session.
    pub fn resolve(&self, user_id: &str) -> Session {
        Session::new(user_id, self.policy_for(user_id))
    }
}

/// Outcome of [`QuotaGate::use_quota`](crate::QuotaGate::use_quota).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaUse {
    pub success: bool,
    pub remaining: u32,
}

/// Daily limit as reported to clients: a number, or `"Unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaTotal {
    Limited(u32),
    Unlimited,
}

impl Serialize for QuotaTotal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Limited(n) => serializer.serialize_u32(*n),
            Self::Unlimited => serializer.serialize_str("Unlimited"),
        }
    }
}

/// Quota summary for `GET /quota`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaSnapshot {
    pub remaining: u32,
    pub used: u32,
    pub total: QuotaTotal,
    pub is_demo: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_account_is_unlimited() {
        let resolver = PolicyResolver::default();
        assert_eq!(resolver.policy_for("demo-user-id"), QuotaPolicy::Unlimited);
        assert_eq!(resolver.policy_for("alice"), QuotaPolicy::Metered(3));
    }

    #[test]
    fn disabled_demo_is_metered() {
        let resolver = PolicyResolver::new(5, None);
        assert_eq!(resolver.policy_for("demo-user-id"), QuotaPolicy::Metered(5));
        assert!(!resolver.is_demo("demo-user-id"));
    }

    #[test]
    fn resolve_carries_id_and_policy() {
        let resolver = PolicyResolver::new(7, Some("guest".into()));
        assert_eq!(
            resolver.resolve("bob"),
            Session::new("bob", QuotaPolicy::Metered(7))
        );
        assert_eq!(
            resolver.resolve("guest"),
            Session::new("guest", QuotaPolicy::Unlimited)
        );
    }

    #[test]
    fn total_serializes_as_number_or_string() {
        let limited = serde_json::to_value(QuotaTotal::Limited(3)).unwrap();
        let unlimited = serde_json::to_value(QuotaTotal::Unlimited).unwrap();
        assert_eq!(limited, serde_json::json!(3));
        assert_eq!(unlimited, serde_json::json!("Unlimited"));
    }

    #[test]
    fn snapshot_uses_camel_case() {
        let snap = QuotaSnapshot {
            remaining: 999_999,
            used: 0,
            total: QuotaTotal::Unlimited,
            is_demo: true,
        };
        let json = serde_json::to_value(snap).unwrap();
        assert_eq!(json["isDemo"], true);
        assert_eq!(json["total"], "Unlimited");
    }
}
