//! Error types for sqlctx

use std::time::Duration;
use thiserror::Error;

/// Boxed error produced by a driver implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for sqlctx operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum DbError {
    /// Error reported by the underlying driver, surfaced verbatim
    #[error("Driver error: {0}")]
    Driver(#[source] BoxError),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(Duration),

    /// Builder input that cannot produce a valid statement
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A batch insert row whose length differs from the field list
    #[error("Row {row} has {got} values, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// The unit of work failed and the rollback failed as well.
    ///
    /// Displays the rollback failure; the unit-of-work error stays reachable
    /// through [`std::error::Error::source`] and [`DbError::rollback_cause`].
    #[error("Rollback failed: {rollback}")]
    Rollback {
        rollback: Box<DbError>,
        #[source]
        cause: Box<DbError>,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Wrap a driver error
    pub fn driver(err: impl Into<BoxError>) -> Self {
        Self::Driver(err.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a malformed input error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this is a malformed input error (including batch row length mismatches)
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedInput(_) | Self::RowLength { .. })
    }

    /// The unit-of-work error preserved inside a [`DbError::Rollback`].
    pub fn rollback_cause(&self) -> Option<&DbError> {
        match self {
            Self::Rollback { cause, .. } => Some(&**cause),
            _ => None,
        }
    }
}

#[cfg(feature = "mysql")]
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("Expected one row, got none".to_string()),
            other => Self::Driver(Box::new(other)),
        }
    }
}
