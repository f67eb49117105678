//! `SQLite` connection pool and the request-scoped unit of work.
//!
//! [`Database`] is created once at process start and shared by cloning
//! (the pool is reference counted). Each new connection gets WAL mode,
//! foreign keys and a busy timeout. An in-memory database is backed by a
//! single-connection pool so that every unit of work sees the same data.

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, Transaction};
use tracing::info;

use super::config::{DatabaseConfig, DatabaseUrl};
use super::schema;
use crate::error::{Result, TodoError};

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Alias for a pooled connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout_ms: u32,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;\
             PRAGMA busy_timeout = {};\
             PRAGMA foreign_keys = ON;",
            self.busy_timeout_ms
        ))
    }
}

/// Shared handle to the task/list database.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Open (creating if needed) the database described by `url`.
    pub fn open(url: &DatabaseUrl, config: &DatabaseConfig) -> Result<Self> {
        let (manager, max_size) = match url {
            DatabaseUrl::Memory => (SqliteConnectionManager::memory(), 1),
            DatabaseUrl::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                (SqliteConnectionManager::file(path), config.pool_size.max(1))
            }
        };

        let mut builder = Pool::builder()
            .max_size(max_size)
            .connection_timeout(Duration::from_secs(5))
            .connection_customizer(Box::new(PragmaCustomizer {
                busy_timeout_ms: config.busy_timeout_ms,
            }));
        if *url == DatabaseUrl::Memory {
            // the data lives only as long as its one connection
            builder = builder.idle_timeout(None).max_lifetime(None);
        }
        let pool = builder.build(manager)?;

        info!(%url, pool_size = max_size, "database opened");
        Ok(Self { pool })
    }

    /// Single-connection in-memory database.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Self::open(&DatabaseUrl::Memory, &DatabaseConfig::default())
    }

    /// Check out a connection. It goes back to the pool when dropped.
    pub fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    /// Apply pending schema migrations.
    pub fn migrate(&self) -> Result<u32> {
        let mut conn = self.conn()?;
        schema::run_migrations(&mut conn)
    }

    /// Run `f` inside one transaction on a blocking thread.
    ///
    /// Commits when `f` returns `Ok`, rolls back otherwise. The connection is
    /// released in every case.
    pub async fn unit_of_work<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        T: Send + 'static,
        E: From<TodoError> + Send + 'static,
        F: FnOnce(&Transaction<'_>) -> std::result::Result<T, E> + Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.unit_of_work_blocking(f))
            .await
            .map_err(|e| E::from(TodoError::internal(format!("unit of work panicked: {}", e))))?
    }

    /// Synchronous body of [`Database::unit_of_work`], used by the CLI.
    pub fn unit_of_work_blocking<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        E: From<TodoError>,
        F: FnOnce(&Transaction<'_>) -> std::result::Result<T, E>,
    {
        let mut conn = self.conn().map_err(E::from)?;
        let tx = conn.transaction().map_err(|e| E::from(TodoError::from(e)))?;
        let value = f(&tx)?;
        tx.commit().map_err(|e| E::from(TodoError::from(e)))?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_pool_sets_pragmas() {
        let dir = tempfile::tempdir().unwrap();
        let url = DatabaseUrl::File(dir.path().join("nested").join("todo.db"));
        let db = Database::open(&url, &DatabaseConfig::default()).unwrap();
        let conn = db.conn().unwrap();

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .unwrap();
        let foreign_keys: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(journal_mode, "wal");
        assert_eq!(foreign_keys, 1);
    }

    #[test]
    fn test_in_memory_pool_shares_one_connection() {
        let db = Database::in_memory().unwrap();
        db.migrate().unwrap();
        db.unit_of_work_blocking(|tx| {
            tx.execute("INSERT INTO lists (name) VALUES ('Inbox')", [])
                .map_err(TodoError::from)
        })
        .unwrap();

        let count: i64 = db
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM lists", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_failed_unit_of_work_rolls_back() {
        let db = Database::in_memory().unwrap();
        db.migrate().unwrap();

        let result: std::result::Result<(), TodoError> = db.unit_of_work_blocking(|tx| {
            tx.execute("INSERT INTO lists (name) VALUES ('Inbox')", [])?;
            Err(TodoError::internal("abort"))
        });
        assert!(result.is_err());

        let count: i64 = db
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM lists", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_async_unit_of_work_returns_value() {
        let db = Database::in_memory().unwrap();
        db.migrate().unwrap();
        let id: i64 = db
            .unit_of_work(|tx| {
                tx.execute("INSERT INTO lists (name) VALUES ('Work')", [])?;
                Ok::<_, TodoError>(tx.last_insert_rowid())
            })
            .await
            .unwrap();
        assert_eq!(id, 1);
    }
}
