//! Infrastructure error type
//!
//! Adapters work in terms of [`InfraError`] internally and convert to
//! `DashboardError` at the port boundary (see [`conversions`]).

pub mod conversions;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{component} is not initialized")]
    NotInitialized { component: &'static str },
}

pub type InfraResult<T> = std::result::Result<T, InfraError>;
