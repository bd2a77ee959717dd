//! SQLite schema definitions and migrations.

use rusqlite::Connection;

use crate::error::{BackendError, StorageError, StorageResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> StorageResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        // Fresh database - create base schema then run all migrations
        create_schema_v1(conn)?;
        set_schema_version(conn, 1)?;
        migrate_schema(conn, 1)?;
    } else if current_version < SCHEMA_VERSION {
        migrate_schema(conn, current_version)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(StorageError::Backend(BackendError::MigrationError {
            message: format!(
                "database schema version {} is newer than supported version {}",
                current_version, SCHEMA_VERSION
            ),
        }));
    }

    Ok(())
}

/// Returns true if the FTS5 search table was created.
pub fn fts_table_exists(conn: &Connection) -> StorageResult<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'consultation_fts'",
            [],
            |row| row.get(0),
        )
        .map_err(|e| schema_error("Failed to inspect sqlite_master", e))?;
    Ok(count > 0)
}

fn schema_error(context: &str, e: rusqlite::Error) -> StorageError {
    StorageError::Backend(BackendError::Internal {
        backend_name: "sqlite".to_string(),
        message: format!("{}: {}", context, e),
        source: None,
    })
}

/// Get the current schema version.
fn get_schema_version(conn: &Connection) -> StorageResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| schema_error("Failed to create schema_version table", e))?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

/// Set the schema version.
fn set_schema_version(conn: &Connection, version: i32) -> StorageResult<()> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| schema_error("Failed to clear schema_version", e))?;

    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )
    .map_err(|e| schema_error("Failed to set schema_version", e))?;

    Ok(())
}

/// Create the initial schema (version 1).
///
/// - consultations: the relational store, attributes kept as JSON text
/// - consultation_search: plain search documents matched with LIKE
fn create_schema_v1(conn: &Connection) -> StorageResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS consultations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            last_updated TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| schema_error("Failed to create consultations table", e))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS consultation_search (
            doc_id INTEGER PRIMARY KEY,
            data TEXT NOT NULL,
            content TEXT NOT NULL,
            indexed_at TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| schema_error("Failed to create consultation_search table", e))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_consultations_updated ON consultations(last_updated)",
        [],
    )
    .map_err(|e| schema_error("Failed to create index", e))?;

    Ok(())
}

/// Run schema migrations from current version to latest.
fn migrate_schema(conn: &Connection, from_version: i32) -> StorageResult<()> {
    let mut version = from_version;

    while version < SCHEMA_VERSION {
        match version {
            1 => migrate_v1_to_v2(conn)?,
            _ => {
                return Err(StorageError::Backend(BackendError::MigrationError {
                    message: format!("no migration from schema version {}", version),
                }));
            }
        }
        version += 1;
        set_schema_version(conn, version)?;
        tracing::debug!(version, "Migrated SQLite schema");
    }

    Ok(())
}

/// Migrate from schema version 1 to version 2.
///
/// Adds the FTS5 search table when the linked SQLite supports it. Without
/// FTS5 the plain consultation_search table stays in use.
fn migrate_v1_to_v2(conn: &Connection) -> StorageResult<()> {
    let fts5_available: i32 = conn
        .query_row(
            "SELECT sqlite_compileoption_used('ENABLE_FTS5')",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if fts5_available == 0 {
        tracing::warn!("FTS5 not available - search falls back to LIKE matching");
        return Ok(());
    }

    conn.execute(
        "CREATE VIRTUAL TABLE IF NOT EXISTS consultation_fts USING fts5(
            doc_id UNINDEXED,
            data UNINDEXED,
            content,
            tokenize='unicode61 remove_diacritics 1'
        )",
        [],
    )
    .map_err(|e| schema_error("Failed to create consultation_fts table", e))?;

    Ok(())
}
