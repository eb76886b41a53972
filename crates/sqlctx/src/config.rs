//! Database handle configuration.

use crate::error::{DbError, DbResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::Level;

/// Configuration for [`Db`](crate::Db).
///
/// Deserializable so it can live in an application config file:
///
/// ```toml
/// query_timeout_ms = 3000
/// max_idle_contexts = 64
/// log_sql = true
/// sql_log_level = "info"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Deadline applied to every statement.
    #[serde(rename = "query_timeout_ms", with = "duration_ms")]
    pub query_timeout: Duration,
    /// Cap on idle pooled contexts. `None` keeps every released context.
    pub max_idle_contexts: Option<usize>,
    /// Whether to emit SQL tracing events.
    pub log_sql: bool,
    /// Tracing level for SQL events.
    #[serde(with = "level_name")]
    pub sql_log_level: Level,
    /// Truncate traced SQL (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(10),
            max_idle_contexts: None,
            log_sql: true,
            sql_log_level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl DbConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-statement timeout.
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Cap the number of idle contexts kept by the pool.
    pub fn max_idle_contexts(mut self, max: usize) -> Self {
        self.max_idle_contexts = Some(max);
        self
    }

    /// Enable or disable SQL tracing.
    pub fn log_sql(mut self, enabled: bool) -> Self {
        self.log_sql = enabled;
        self
    }

    /// Override the tracing level for SQL events.
    pub fn sql_log_level(mut self, level: Level) -> Self {
        self.sql_log_level = level;
        self
    }

    /// Set maximum SQL length to trace.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Check that the configuration can drive a handle.
    pub fn validate(&self) -> DbResult<()> {
        if self.query_timeout.is_zero() {
            return Err(DbError::Config(
                "query_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod level_name {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};
    use tracing::Level;

    pub fn serialize<S: Serializer>(level: &Level, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(level)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Level, D::Error> {
        let name = String::deserialize(d)?;
        name.parse::<Level>().map_err(D::Error::custom)
    }
}
