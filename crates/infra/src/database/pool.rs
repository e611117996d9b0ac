//! SQLite pool helpers
//!
//! Thin wrapper around an r2d2 pool of SQLite connections. Every connection
//! is opened with WAL journaling, enforced foreign keys and a busy timeout.

use std::path::Path;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{debug, instrument, warn};

use crate::errors::InfraResult;

pub type SqlitePool = Pool<SqliteConnectionManager>;
pub type SqliteConnection = PooledConnection<SqliteConnectionManager>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a pool of `max_size` connections to the database at `path`.
///
/// The file is created when missing. One connection is opened eagerly so an
/// unusable path fails here rather than on the first query.
#[instrument(skip(path), fields(db_path = %path.as_ref().display()))]
pub fn create_sqlite_pool<P: AsRef<Path>>(
    path: P,
    max_size: u32,
) -> InfraResult<SqlitePool> {
    let manager = SqliteConnectionManager::file(path.as_ref()).with_init(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))?;
        Ok(())
    });

    let pool = Pool::builder()
        .max_size(max_size.max(1))
        .connection_timeout(CONNECTION_TIMEOUT)
        .build(manager)
        .map_err(|e| {
            warn!(error = %e, "Failed to create connection pool");
            e
        })?;

    debug!(max_size = pool.max_size(), "SQLite pool created");
    Ok(pool)
}
