//! Storage and search backend implementations.
//!
//! Each backend is gated behind a feature flag.
//!
//! | Backend | Feature | Provides |
//! |---------|---------|----------|
//! | SQLite | `sqlite` (default) | Repository and search index (FTS5 or LIKE) |
//! | Elasticsearch | `elasticsearch` | Search index |
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "sqlite")]
//! use ayoos_persistence::backends::sqlite::SqliteBackend;
//!
//! # #[cfg(feature = "sqlite")]
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create an in-memory SQLite backend
//! let backend = SqliteBackend::in_memory()?;
//!
//! // Or use a file-based database
//! let backend = SqliteBackend::open("./data/consultation.db")?;
//! backend.init_schema()?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "elasticsearch")]
pub mod elasticsearch;
