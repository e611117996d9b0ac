//! # Dashgate Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - SQLite and in-memory record stores
//! - The moka-backed cache gateway
//! - The JSON-lines monitor observer
//! - Configuration loading and tracing initialisation
//! - [`ConnectionManager`], which owns the store and cache lifecycle
//!
//! ## Architecture
//! - Implements traits defined in `dashgate-core`
//! - Contains all "impure" code (file, database and cache I/O)

pub mod cache;
pub mod config;
pub mod database;
pub mod errors;
pub mod manager;
pub mod observability;
pub mod observers;

// Re-export commonly used items
pub use cache::MokaCacheGateway;
pub use database::{DbManager, InMemoryRecordStore, SqliteRecordStore};
pub use errors::{InfraError, InfraResult};
pub use manager::ConnectionManager;
pub use observability::{init_tracing, LogFormat};
pub use observers::{monitor_from_config, FileLogObserver};
