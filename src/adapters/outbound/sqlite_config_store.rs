//! SQLite Config Store
//!
//! Implements ConfigStore on top of a single SQLite file so the blocked
//! country survives restarts of the host.

use crate::domain::entities::SiteScope;
use crate::domain::ports::{ConfigStore, ConfigStoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS site_variables (
    account_id TEXT NOT NULL,
    site_id    TEXT NOT NULL,
    key        TEXT NOT NULL,
    value      TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
    PRIMARY KEY (account_id, site_id, key)
)";

/// SQLite-backed configuration store.
///
/// All statements run on the blocking thread pool; the connection is shared
/// behind a mutex.
pub struct SqliteConfigStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteConfigStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: &str) -> Result<Self, ConfigStoreError> {
        let conn = Connection::open(path).map_err(backend_error)?;
        Self::with_connection(conn)
    }

    /// In-memory database, mostly useful for tests.
    pub fn open_in_memory() -> Result<Self, ConfigStoreError> {
        let conn = Connection::open_in_memory().map_err(backend_error)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, ConfigStoreError> {
        conn.execute(SCHEMA, []).map_err(backend_error)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn run<T, F>(&self, f: F) -> Result<T, ConfigStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await
        .map_err(|e| ConfigStoreError::Task(e.to_string()))?
        .map_err(backend_error)
    }
}

fn backend_error(e: rusqlite::Error) -> ConfigStoreError {
    ConfigStoreError::Backend(e.to_string())
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    async fn get_variable(
        &self,
        scope: &SiteScope,
        key: &str,
    ) -> Result<Option<String>, ConfigStoreError> {
        let scope = scope.clone();
        let key = key.to_string();
        self.run(move |conn| {
            conn.query_row(
                "SELECT value FROM site_variables
                 WHERE account_id = ?1 AND site_id = ?2 AND key = ?3",
                params![scope.account_id, scope.site_id, key],
                |row| row.get(0),
            )
            .optional()
        })
        .await
    }

    async fn set_variable(
        &self,
        scope: &SiteScope,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigStoreError> {
        let scope = scope.clone();
        let key = key.to_string();
        let value = value.to_string();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO site_variables (account_id, site_id, key, value)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (account_id, site_id, key)
                 DO UPDATE SET value = excluded.value,
                               updated_at = strftime('%s', 'now')",
                params![scope.account_id, scope.site_id, key, value],
            )
            .map(|_| ())
        })
        .await
    }
}
