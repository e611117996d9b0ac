//! Macro for implementing Display and FromStr for label enums
//!
//! Order statuses and alert kinds travel as lowercase labels (SQLite
//! columns, JSON lines, log fields). This macro derives both directions of
//! that mapping from a single table so they cannot drift apart.
//!
//! # Example
//!
//! ```rust
//! use dashgate_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum PaymentState {
//!     Authorized,
//!     Captured,
//!     Refunded,
//! }
//!
//! impl_domain_status_conversions!(PaymentState {
//!     Authorized => "authorized",
//!     Captured => "captured",
//!     Refunded => "refunded",
//! });
//!
//! assert_eq!(PaymentState::Captured.to_string(), "captured");
//! assert_eq!("REFUNDED".parse::<PaymentState>(), Ok(PaymentState::Refunded));
//! ```

/// Implements Display and FromStr traits for label enums
///
/// Display writes the mapped label; FromStr accepts it case-insensitively
/// and reports the enum name on failure.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
