//! SQLite backend implementation.
//!
//! One [`SqliteBackend`] implements both the relational store
//! ([`ConsultationRepository`](crate::core::ConsultationRepository)) and the
//! search index ([`ConsultationSearchIndex`](crate::core::ConsultationSearchIndex)).
//! It supports in-memory databases (great for testing) and file-based
//! databases.
//!
//! # Example
//!
//! ```no_run
//! use ayoos_persistence::backends::sqlite::SqliteBackend;
//! use ayoos_persistence::core::DefaultConsultationService;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::in_memory()?;
//! backend.init_schema()?;
//!
//! // The same database serves as store and index
//! let service = DefaultConsultationService::new(backend.clone(), backend);
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE consultations (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     data TEXT NOT NULL,          -- attributes as JSON
//!     created_at TEXT NOT NULL,
//!     last_updated TEXT NOT NULL
//! );
//!
//! -- Search documents, FTS5 when available
//! CREATE VIRTUAL TABLE consultation_fts USING fts5(doc_id UNINDEXED, data UNINDEXED, content);
//!
//! -- Search documents otherwise, matched with LIKE
//! CREATE TABLE consultation_search (
//!     doc_id INTEGER PRIMARY KEY,
//!     data TEXT NOT NULL,
//!     content TEXT NOT NULL,
//!     indexed_at TEXT NOT NULL
//! );
//! ```

mod backend;
mod repository;
mod schema;
mod search_index;

pub use backend::{SqliteBackend, SqliteBackendConfig};
pub use schema::SCHEMA_VERSION;
