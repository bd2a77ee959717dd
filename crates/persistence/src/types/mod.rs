//! Core types for the persistence layer.
//!
//! - [`ConsultationDto`] - The consultation record
//! - [`PageRequest`], [`SortOrder`] - What slice of a result set to fetch
//! - [`Page`] - A fetched slice plus its totals
//!
//! # Example
//!
//! ```
//! use ayoos_persistence::types::{Page, PageRequest, SortOrder};
//!
//! let request = PageRequest::new(1, 10).with_sort(SortOrder::desc("name"));
//! assert_eq!(request.offset(), 10);
//!
//! let page: Page<i64> = Page::new(vec![11, 12], &request, 12);
//! assert_eq!(page.total_pages(), 2);
//! assert!(!page.has_next());
//! ```

mod consultation;
mod pagination;

pub use consultation::{ConsultationDto, ENTITY_NAME};
pub use pagination::{DEFAULT_PAGE_SIZE, Page, PageRequest, SortDirection, SortOrder};
