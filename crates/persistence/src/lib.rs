//! Ayoos Consultation Persistence Layer
//!
//! This crate stores consultation records in a relational store, mirrors them
//! into a full-text search index, and exposes both through a service trait
//! consumed by the HTTP layer.
//!
//! # Architecture
//!
//! - [`types`] - The consultation record and pagination types
//! - [`error`] - Error types for all operations
//! - [`core`] - Repository, search index and service traits
//! - [`backends`] - SQLite (store + index) and Elasticsearch (index)
//!
//! # Quick Start
//!
//! ```no_run
//! use ayoos_persistence::backends::sqlite::SqliteBackend;
//! use ayoos_persistence::core::{ConsultationService, DefaultConsultationService};
//! use ayoos_persistence::types::{ConsultationDto, PageRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::in_memory()?;
//! backend.init_schema()?;
//! let service = DefaultConsultationService::new(backend.clone(), backend);
//!
//! let saved = service
//!     .save(ConsultationDto::default().with_attribute("name", "follow-up"))
//!     .await?;
//! assert_eq!(saved.id, Some(1));
//!
//! let hits = service.search("follow*", &PageRequest::default()).await?;
//! assert_eq!(hits.total_elements, 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{StorageError, StorageResult};
pub use types::{ConsultationDto, Page, PageRequest, SortDirection, SortOrder};

// Re-export core traits
pub use crate::core::{
    ConsultationRepository, ConsultationSearchIndex, ConsultationService,
    DefaultConsultationService,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
