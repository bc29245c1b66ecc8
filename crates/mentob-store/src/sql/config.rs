//! Connection settings for [`SqlStore`](super::SqlStore).

use std::time::Duration;

use mentob_core::{
    DEFAULT_DB_CONNECT_TIMEOUT_SECS, DEFAULT_DB_IDLE_TIMEOUT_SECS, DEFAULT_DB_MAX_CONNECTIONS,
    DEFAULT_DB_MAX_LIFETIME_SECS, DEFAULT_DB_MIN_CONNECTIONS,
};

/// Pool and schema settings for the SQL store.
///
/// `database_url` selects the dialect: `postgres://`, `mysql://` or
/// `sqlite:` (`sqlite::memory:` for a private in-memory database).
#[derive(Debug, Clone)]
pub struct SqlStoreConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a request may wait for a pooled connection.
    pub connect_timeout: Duration,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
    /// Run [`SqlStore::migrate`](super::SqlStore::migrate) after connecting.
    pub auto_migrate: bool,
}

impl Default for SqlStoreConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            min_connections: DEFAULT_DB_MIN_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_DB_CONNECT_TIMEOUT_SECS),
            max_lifetime: Duration::from_secs(DEFAULT_DB_MAX_LIFETIME_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_DB_IDLE_TIMEOUT_SECS),
            auto_migrate: false,
        }
    }
}

impl SqlStoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    pub fn min_connections(mut self, n: u32) -> Self {
        self.min_connections = n;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn auto_migrate(mut self, enabled: bool) -> Self {
        self.auto_migrate = enabled;
        self
    }

    /// Whether the URL names a private in-memory SQLite database.
    ///
    /// Every connection to such a URL opens its own empty database, so the
    /// pool must hold exactly one connection that never expires.
    pub fn is_private_memory(&self) -> bool {
        let url = self.database_url.as_str();
        url.starts_with("sqlite::memory:")
            || (url.starts_with("sqlite:") && url.contains("mode=memory") && !url.contains("cache=shared"))
    }

    /// URL scheme, safe to log (credentials live after it).
    pub fn scheme(&self) -> &str {
        self.database_url.split(':').next().unwrap_or_default()
    }
}
