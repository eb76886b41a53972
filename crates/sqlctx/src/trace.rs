//! SQL statement tracing under target `sqlctx.sql`.

use crate::config::DbConfig;
use crate::sql::truncate_sql_bytes;
use crate::value::Value;
use tracing::Level;

/// Which driver call a statement goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    FindOne,
    FindMany,
    Exec,
}

impl StatementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatementKind::FindOne => "find_one",
            StatementKind::FindMany => "find_many",
            StatementKind::Exec => "exec",
        }
    }
}

/// Emits the SQL that is about to be executed, under target `sqlctx.sql`.
#[derive(Debug, Clone)]
pub(crate) struct SqlTracer {
    enabled: bool,
    level: Level,
    max_sql_length: Option<usize>,
}

impl Default for SqlTracer {
    fn default() -> Self {
        Self::from_config(&DbConfig::default())
    }
}

impl SqlTracer {
    pub(crate) fn from_config(config: &DbConfig) -> Self {
        Self {
            enabled: config.log_sql,
            level: config.sql_log_level,
            max_sql_length: config.max_sql_length,
        }
    }

    fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }

    pub(crate) fn statement(&self, kind: StatementKind, ctx: u64, sql: &str, params: &[Value]) {
        if !self.enabled {
            return;
        }

        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(sql);
        emit_at_level!(
            self.level,
            target: "sqlctx.sql",
            op = kind.as_str(),
            ctx,
            param_count = params.len(),
            sql = %sql,
            params = ?params,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_adds_ellipsis() {
        let tracer = SqlTracer::from_config(&DbConfig::new().max_sql_length(6));
        assert_eq!(tracer.truncate_sql("select * from t"), "select...");
        assert_eq!(tracer.truncate_sql("select"), "select");
    }

    #[test]
    fn test_no_truncate() {
        let tracer = SqlTracer::from_config(&DbConfig::new().no_truncate());
        let long = "x".repeat(1000);
        assert_eq!(tracer.truncate_sql(&long), long);
    }
}
