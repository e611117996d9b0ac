//! # Dashgate Domain
//!
//! Business domain types and models for Dashgate.
//!
//! This crate contains:
//! - Dashboard read-model types (DashboardRecord, OrderSummary, etc.)
//! - Execution events, alerts and metrics snapshots
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - Depends only on the foundation tier of `dashgate-common`
//! - Pure domain models and data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
