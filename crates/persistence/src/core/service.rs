//! Consultation service combining the relational store and the search index.

use async_trait::async_trait;
use tracing::debug;

use crate::core::{ConsultationRepository, ConsultationSearchIndex};
use crate::error::StorageResult;
use crate::types::{ConsultationDto, Page, PageRequest};

/// Operations the HTTP layer performs on consultations.
#[async_trait]
pub trait ConsultationService: Send + Sync {
    /// Returns a name describing the store and index in use.
    fn backend_name(&self) -> String;

    /// Saves a record and (re)indexes the saved copy.
    async fn save(&self, dto: ConsultationDto) -> StorageResult<ConsultationDto>;

    /// Returns one page of records.
    async fn find_all(&self, request: &PageRequest) -> StorageResult<Page<ConsultationDto>>;

    /// Reads a single record.
    async fn find_one(&self, id: i64) -> StorageResult<Option<ConsultationDto>>;

    /// Deletes a record from the store and the index.
    async fn delete(&self, id: i64) -> StorageResult<()>;

    /// Searches the index.
    async fn search(
        &self,
        query: &str,
        request: &PageRequest,
    ) -> StorageResult<Page<ConsultationDto>>;
}

/// [`ConsultationService`] over a repository and a search index.
#[derive(Debug)]
pub struct DefaultConsultationService<R, I> {
    repository: R,
    search_index: I,
}

impl<R, I> DefaultConsultationService<R, I>
where
    R: ConsultationRepository,
    I: ConsultationSearchIndex,
{
    /// Creates a service over the given store and index.
    pub fn new(repository: R, search_index: I) -> Self {
        Self {
            repository,
            search_index,
        }
    }

    /// Returns the repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Returns the search index.
    pub fn search_index(&self) -> &I {
        &self.search_index
    }
}

#[async_trait]
impl<R, I> ConsultationService for DefaultConsultationService<R, I>
where
    R: ConsultationRepository,
    I: ConsultationSearchIndex,
{
    fn backend_name(&self) -> String {
        format!(
            "{}+{}",
            self.repository.backend_name(),
            self.search_index.backend_name()
        )
    }

    async fn save(&self, dto: ConsultationDto) -> StorageResult<ConsultationDto> {
        debug!(id = ?dto.id, "Request to save consultation");
        let saved = self.repository.save(dto).await?;
        self.search_index.index(&saved).await?;
        Ok(saved)
    }

    async fn find_all(&self, request: &PageRequest) -> StorageResult<Page<ConsultationDto>> {
        debug!(page = request.page, size = request.size, "Request to get all consultations");
        self.repository.find_all(request).await
    }

    async fn find_one(&self, id: i64) -> StorageResult<Option<ConsultationDto>> {
        debug!(id, "Request to get consultation");
        self.repository.find_by_id(id).await
    }

    async fn delete(&self, id: i64) -> StorageResult<()> {
        debug!(id, "Request to delete consultation");
        self.repository.delete_by_id(id).await?;
        self.search_index.remove(id).await
    }

    async fn search(
        &self,
        query: &str,
        request: &PageRequest,
    ) -> StorageResult<Page<ConsultationDto>> {
        debug!(query, page = request.page, size = request.size, "Request to search consultations");
        self.search_index.search(query, request).await
    }
}
