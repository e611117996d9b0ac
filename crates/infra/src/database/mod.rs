//! Record store implementations
//!
//! - [`SqliteRecordStore`]: durable store over an r2d2 pool of SQLite
//!   connections, owned by [`DbManager`]
//! - [`InMemoryRecordStore`]: same lookup semantics over a `HashMap`

pub mod manager;
pub mod memory_store;
pub mod pool;
pub mod sqlite_store;

pub use manager::DbManager;
pub use memory_store::InMemoryRecordStore;
pub use pool::{create_sqlite_pool, SqliteConnection, SqlitePool};
pub use sqlite_store::SqliteRecordStore;
