//! Core storage traits.
//!
//! - [`ConsultationRepository`] - Relational CRUD with paging
//! - [`ConsultationSearchIndex`] - Full-text index mirroring the repository
//! - [`ConsultationService`] - What the HTTP layer calls; [`DefaultConsultationService`]
//!   composes a repository and an index
//!
//! ```text
//! ConsultationService
//!     ├── ConsultationRepository   (save, find_by_id, find_all, delete_by_id, count)
//!     └── ConsultationSearchIndex  (index, remove, search)
//! ```

mod repository;
mod search;
mod service;

pub use repository::{ConsultationRepository, validate_sort_property};
pub use search::{ConsultationSearchIndex, SearchQuery, SearchTerm};
pub use service::{ConsultationService, DefaultConsultationService};
