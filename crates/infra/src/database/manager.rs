//! Database manager owning the SQLite pool and the schema.

use std::path::{Path, PathBuf};

use rusqlite::params;
use tracing::info;

use super::pool::{create_sqlite_pool, SqliteConnection, SqlitePool};
use crate::errors::InfraResult;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Database manager that wraps a [`SqlitePool`].
pub struct DbManager {
    pool: SqlitePool,
    path: PathBuf,
}

impl DbManager {
    /// Open (or create) the database at `db_path` with the given pool size.
    pub fn new<P: AsRef<Path>>(db_path: P, pool_size: u32) -> InfraResult<Self> {
        let path = db_path.as_ref().to_path_buf();
        let pool = create_sqlite_pool(&path, pool_size)?;

        info!(
            db_path = %path.display(),
            max_connections = pool.max_size(),
            "sqlite pool initialised"
        );

        Ok(Self { pool, path })
    }

    /// Borrow the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> InfraResult<SqliteConnection> {
        Ok(self.pool.get()?)
    }

    /// Ensure the full schema exists on the current database.
    pub fn run_migrations(&self) -> InfraResult<()> {
        let conn = self.get_connection()?;
        create_schema(&conn)
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire a connection and run a trivial query against it.
    pub fn health_check(&self) -> InfraResult<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0))?;
        Ok(())
    }
}

fn create_schema(conn: &SqliteConnection) -> InfraResult<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, CAST(strftime('%s','now') AS INTEGER))",
        params![SCHEMA_VERSION],
    )?;
    Ok(())
}
