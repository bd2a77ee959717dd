//! SQLite backend implementation.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use serde::{Deserialize, Serialize};

use crate::error::{BackendError, StorageError, StorageResult};

use super::schema;

/// SQLite backend for consultation storage and search.
///
/// Cloning is cheap; clones share the connection pool. One backend usually
/// serves as both the repository and the search index.
#[derive(Clone)]
pub struct SqliteBackend {
    pool: Pool<SqliteConnectionManager>,
    config: SqliteBackendConfig,
    is_memory: bool,
    fts_enabled: Arc<AtomicBool>,
}

impl Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("config", &self.config)
            .field("is_memory", &self.is_memory)
            .field("fts_enabled", &self.fts_enabled())
            .finish_non_exhaustive()
    }
}

/// Configuration for the SQLite backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteBackendConfig {
    /// Maximum number of connections in the pool. In-memory databases always use one.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,

    /// Enable WAL mode for file databases.
    #[serde(default = "default_true")]
    pub enable_wal: bool,

    /// Use FTS5 for search when the linked SQLite provides it.
    #[serde(default = "default_true")]
    pub enable_fts: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_connection_timeout_ms() -> u64 {
    30000
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for SqliteBackendConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            enable_wal: true,
            enable_fts: true,
        }
    }
}

impl SqliteBackend {
    /// Creates a new in-memory SQLite backend.
    pub fn in_memory() -> StorageResult<Self> {
        Self::with_config(":memory:", SqliteBackendConfig::default())
    }

    /// Opens or creates a file-based SQLite database.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        Self::with_config(path, SqliteBackendConfig::default())
    }

    /// Creates a backend with custom configuration.
    ///
    /// Every pooled connection gets the busy timeout, and file databases are
    /// switched to WAL. Call [`init_schema`](Self::init_schema) before use.
    pub fn with_config<P: AsRef<Path>>(
        path: P,
        config: SqliteBackendConfig,
    ) -> StorageResult<Self> {
        let path_str = path.as_ref().to_string_lossy();
        let is_memory = path_str == ":memory:" || path_str.is_empty();

        let busy_timeout = Duration::from_millis(config.busy_timeout_ms as u64);
        let use_wal = config.enable_wal && !is_memory;
        let manager = if is_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path.as_ref())
        }
        .with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            if use_wal {
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                    row.get::<_, String>(0)
                })?;
            }
            Ok(())
        });

        // Each in-memory connection is its own database, so the pool holds
        // exactly one and never recycles it.
        let builder = if is_memory {
            Pool::builder()
                .max_size(1)
                .min_idle(Some(1))
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            Pool::builder()
                .max_size(config.max_connections.max(1))
                .min_idle(Some(1))
        };

        let pool = builder
            .connection_timeout(Duration::from_millis(config.connection_timeout_ms))
            .build(manager)
            .map_err(|e| {
                StorageError::Backend(BackendError::ConnectionFailed {
                    backend_name: "sqlite".to_string(),
                    message: e.to_string(),
                })
            })?;

        tracing::debug!(path = %path_str, is_memory, "Opened SQLite connection pool");

        Ok(Self {
            pool,
            config,
            is_memory,
            fts_enabled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Initialize the database schema.
    pub fn init_schema(&self) -> StorageResult<()> {
        let conn = self.get_connection()?;
        schema::initialize_schema(&conn)?;

        let fts = self.config.enable_fts && schema::fts_table_exists(&conn)?;
        self.fts_enabled.store(fts, Ordering::Relaxed);
        if fts {
            tracing::info!("SQLite search index using FTS5");
        } else {
            tracing::info!("SQLite search index using LIKE matching");
        }
        Ok(())
    }

    /// Get a connection from the pool.
    pub(crate) fn get_connection(
        &self,
    ) -> StorageResult<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| {
            StorageError::Backend(BackendError::ConnectionFailed {
                backend_name: "sqlite".to_string(),
                message: e.to_string(),
            })
        })
    }

    /// Returns whether this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns true when searches go through the FTS5 table.
    pub fn fts_enabled(&self) -> bool {
        self.fts_enabled.load(Ordering::Relaxed)
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &SqliteBackendConfig {
        &self.config
    }

    /// Checks that a connection can be acquired and used.
    pub fn health_check(&self) -> Result<(), BackendError> {
        let conn = self
            .get_connection()
            .map_err(|_| BackendError::Unavailable {
                backend_name: "sqlite".to_string(),
                message: "Failed to get connection".to_string(),
            })?;

        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|e| BackendError::Unavailable {
                backend_name: "sqlite".to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_backend() {
        let backend = SqliteBackend::in_memory().unwrap();
        assert!(backend.is_memory());
        backend.init_schema().unwrap();
        assert!(backend.health_check().is_ok());
    }

    #[test]
    fn test_in_memory_clones_share_database() {
        let backend = SqliteBackend::in_memory().unwrap();
        backend.init_schema().unwrap();
        let clone = backend.clone();

        let conn = clone.get_connection().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM consultations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_fts_detected() {
        let backend = SqliteBackend::in_memory().unwrap();
        assert!(!backend.fts_enabled());
        backend.init_schema().unwrap();
        // The bundled SQLite is compiled with FTS5.
        assert!(backend.fts_enabled());
    }

    #[test]
    fn test_fts_disabled_by_config() {
        let config = SqliteBackendConfig {
            enable_fts: false,
            ..Default::default()
        };
        let backend = SqliteBackend::with_config(":memory:", config).unwrap();
        backend.init_schema().unwrap();
        assert!(!backend.fts_enabled());
    }

    #[test]
    fn test_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consultations.db");
        let backend = SqliteBackend::open(&path).unwrap();
        assert!(!backend.is_memory());
        backend.init_schema().unwrap();
        // Second initialization is a no-op.
        backend.init_schema().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: SqliteBackendConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.busy_timeout_ms, 5000);
        assert!(config.enable_wal);
        assert!(config.enable_fts);
    }
}
