//! Relational store trait for consultation records.

use async_trait::async_trait;

use crate::error::{StorageResult, ValidationError};
use crate::types::{ConsultationDto, Page, PageRequest};

/// Relational storage for consultation records.
///
/// The repository owns record identity: it assigns ids on insert and never
/// reuses them.
///
/// # Example
///
/// ```ignore
/// use ayoos_persistence::core::ConsultationRepository;
/// use ayoos_persistence::types::{ConsultationDto, PageRequest};
///
/// async fn example<R: ConsultationRepository>(repo: &R) -> StorageResult<()> {
///     let saved = repo.save(ConsultationDto::default().with_attribute("name", "x")).await?;
///     let id = saved.id.unwrap();
///
///     let found = repo.find_by_id(id).await?;
///     assert_eq!(found, Some(saved));
///
///     let page = repo.find_all(&PageRequest::default()).await?;
///     assert_eq!(page.total_elements, 1);
///
///     repo.delete_by_id(id).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ConsultationRepository: Send + Sync {
    /// Returns a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;

    /// Inserts or updates a record.
    ///
    /// A record without an id is inserted and returned with a generated id.
    /// A record with an id replaces the stored attributes of that row; if no
    /// such row exists it is inserted under the given id.
    async fn save(&self, dto: ConsultationDto) -> StorageResult<ConsultationDto>;

    /// Reads a record by id.
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<ConsultationDto>>;

    /// Returns one page of records.
    ///
    /// # Errors
    ///
    /// * `StorageError::Validation(InvalidSortProperty)` - If a sort order
    ///   names something other than `id` or a plain attribute name
    async fn find_all(&self, request: &PageRequest) -> StorageResult<Page<ConsultationDto>>;

    /// Deletes a record. Deleting an absent id is not an error.
    async fn delete_by_id(&self, id: i64) -> StorageResult<()>;

    /// Counts all stored records.
    async fn count(&self) -> StorageResult<u64>;
}

/// Checks that a sort property is `id` or a plain attribute name.
///
/// Attribute names must match `[A-Za-z_][A-Za-z0-9_]*` so they can be used
/// as a JSON path without quoting.
pub fn validate_sort_property(property: &str) -> Result<(), ValidationError> {
    let mut chars = property.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidSortProperty {
            property: property.to_string(),
        })
    }
}
