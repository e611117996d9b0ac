//! Error types used throughout the application

use std::time::Duration;

use dashgate_common::error::{ErrorClassification, ErrorSeverity};
use thiserror::Error;

/// Main error type for dashboard queries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// Caller-input fault; never retried, never counted by the breaker
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Query timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Retry budget spent; `source` is the last underlying failure
    #[error("Query failed after {attempts} attempts: {source}")]
    Query {
        attempts: u32,
        #[source]
        source: Box<DashboardError>,
    },

    #[error("Circuit breaker is open")]
    CircuitOpen { retry_after: Option<Duration> },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Result type alias for dashboard operations
pub type DashboardResult<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store { message: message.into() }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Stable short label used in events and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Store { .. } => "store",
            Self::Cache { .. } => "cache",
            Self::Timeout { .. } => "timeout",
            Self::Query { .. } => "query",
            Self::CircuitOpen { .. } => "circuit_open",
            Self::Serialization { .. } => "serialization",
            Self::Config { .. } => "config",
            Self::Internal { .. } => "internal",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Follows `Query` wrappers down to the original failure.
    pub fn root_cause(&self) -> &DashboardError {
        let mut current = self;
        while let Self::Query { source, .. } = current {
            current = source;
        }
        current
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization { message: err.to_string() }
    }
}

impl ErrorClassification for DashboardError {
    fn is_retryable(&self) -> bool {
        !matches!(self, Self::Validation { .. } | Self::Config { .. })
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation { .. } | Self::Timeout { .. } | Self::CircuitOpen { .. } => {
                ErrorSeverity::Warning
            }
            Self::Store { .. }
            | Self::Cache { .. }
            | Self::Query { .. }
            | Self::Serialization { .. }
            | Self::Config { .. } => ErrorSeverity::Error,
            Self::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::CircuitOpen { retry_after } => *retry_after,
            _ => None,
        }
    }
}
