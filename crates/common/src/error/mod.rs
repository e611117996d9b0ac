//! Error classification shared by every Dashgate error type
//!
//! Module-specific error enums stay in the crate that owns them. What they
//! share is the [`ErrorClassification`] contract, which lets generic
//! infrastructure (retry policies, log sinks, alerting) make decisions about
//! an error without knowing its concrete type.
//!
//! ## ErrorSeverity Levels
//!
//! | Level | Use Case | Examples |
//! |-------|----------|----------|
//! | **Info** | Informational, expected conditions | Resource not found, empty results |
//! | **Warning** | Degraded but operational | Circuit open, timeouts, transient failures |
//! | **Error** | Failure requiring attention | Backend faults, invalid input, config errors |
//! | **Critical** | System integrity at risk | Internal invariant violations |
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use dashgate_common::error::{ErrorClassification, ErrorSeverity};
//!
//! #[derive(Debug)]
//! enum WidgetError {
//!     Invalid,
//!     Unavailable,
//! }
//!
//! impl ErrorClassification for WidgetError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, Self::Unavailable)
//!     }
//!
//!     fn severity(&self) -> ErrorSeverity {
//!         match self {
//!             Self::Invalid => ErrorSeverity::Error,
//!             Self::Unavailable => ErrorSeverity::Warning,
//!         }
//!     }
//!
//!     fn is_critical(&self) -> bool {
//!         false
//!     }
//!
//!     fn retry_after(&self) -> Option<Duration> {
//!         None
//!     }
//! }
//!
//! assert!(WidgetError::Unavailable.is_retryable());
//! assert!(!WidgetError::Invalid.is_retryable());
//! ```

use std::fmt;
use std::time::Duration;

/// Error classification trait for consistent error handling across modules
///
/// This trait provides a standard interface for classifying errors by their
/// characteristics, enabling consistent retry logic, monitoring, and alerting
/// across the workspace.
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again, such as backend outages, timeouts or an open circuit.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Used for monitoring, alerting, and logging decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl ErrorSeverity {
    /// Whether this severity should page someone.
    pub fn is_actionable(self) -> bool {
        self >= ErrorSeverity::Error
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
