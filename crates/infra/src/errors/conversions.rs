//! Conversions from infrastructure errors into `DashboardError`.
//!
//! Every store-side fault becomes `DashboardError::Store` so the decorator
//! chain treats it as a retryable dependency failure. SQLite failure codes
//! are narrowed to a short message first so logs stay readable.

use dashgate_domain::DashboardError;
use rusqlite::Error as SqlError;

use super::InfraError;

impl From<InfraError> for DashboardError {
    fn from(value: InfraError) -> Self {
        match value {
            InfraError::Sqlite(err) => DashboardError::store(describe_sqlite(err)),
            InfraError::Pool(err) => DashboardError::store(format!("connection pool: {err}")),
            InfraError::Io(err) => DashboardError::store(format!("I/O failure: {err}")),
            InfraError::Serialization(err) => DashboardError::from(err),
            InfraError::Join(err) => {
                DashboardError::internal(format!("blocking store task failed: {err}"))
            }
            InfraError::NotInitialized { component } => {
                DashboardError::config(format!("{component} is not initialized"))
            }
        }
    }
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → message */
/* -------------------------------------------------------------------------- */

fn describe_sqlite(err: SqlError) -> String {
    use rusqlite::ffi::ErrorCode;

    match err {
        SqlError::SqliteFailure(failure, maybe_message) => {
            let message = maybe_message.unwrap_or_default();
            match failure.code {
                ErrorCode::DatabaseBusy => "database is busy".into(),
                ErrorCode::DatabaseLocked => "database is locked".into(),
                ErrorCode::CannotOpen => format!("unable to open database: {message}"),
                ErrorCode::NotADatabase => "file is not a database".into(),
                _ => format!(
                    "sqlite failure {:?} (code {}): {}",
                    failure.code, failure.extended_code, message
                ),
            }
        }
        SqlError::FromSqlConversionFailure(column, _, cause) => {
            format!("failed to convert column {column}: {cause}")
        }
        SqlError::InvalidColumnType(_, name, ty) => {
            format!("invalid column type for {name}: {ty}")
        }
        SqlError::InvalidPath(path) => {
            format!("invalid database path: {}", path.to_string_lossy())
        }
        other => other.to_string(),
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
