//! Common test utilities for REST API testing.
//!
//! - SQLite-backed test servers
//! - [`RecordingService`], a service double that records every call

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use ayoos_persistence::backends::sqlite::SqliteBackend;
use ayoos_persistence::core::{ConsultationService, DefaultConsultationService};
use ayoos_persistence::error::{BackendError, StorageResult};
use ayoos_persistence::types::{ConsultationDto, Page, PageRequest};

use ayoos_rest::{ServerConfig, create_app_with_config};

/// The SQLite-backed service used by the end-to-end tests.
pub type SqliteService = DefaultConsultationService<SqliteBackend, SqliteBackend>;

/// Creates a service over a fresh in-memory database.
pub fn sqlite_service() -> SqliteService {
    let backend = SqliteBackend::in_memory().expect("Failed to create SQLite backend");
    backend.init_schema().expect("Failed to init schema");
    DefaultConsultationService::new(backend.clone(), backend)
}

/// Creates a test server over a fresh in-memory database.
pub fn sqlite_server() -> TestServer {
    sqlite_server_with_config(ServerConfig::for_testing())
}

/// Creates a test server over a fresh in-memory database with `config`.
pub fn sqlite_server_with_config(config: ServerConfig) -> TestServer {
    let app = create_app_with_config(sqlite_service(), config);
    TestServer::new(app).expect("Failed to create test server")
}

/// Creates a test server over the SQLite database file at `path`.
pub fn file_server(path: &std::path::Path) -> TestServer {
    let backend = SqliteBackend::open(path).expect("Failed to open SQLite database");
    backend.init_schema().expect("Failed to init schema");
    let service = DefaultConsultationService::new(backend.clone(), backend);
    let app = create_app_with_config(service, ServerConfig::for_testing());
    TestServer::new(app).expect("Failed to create test server")
}

/// Service double that records calls and answers from canned data.
#[derive(Clone, Default)]
pub struct RecordingService {
    /// Names of the operations called, in order.
    pub calls: Arc<Mutex<Vec<String>>>,
    /// Records returned by `find_all` and `search`, in this order.
    pub records: Vec<ConsultationDto>,
    /// Total element count reported by `find_all` and `search`.
    pub total: u64,
    /// Fail every operation with a backend error.
    pub fail: bool,
}

impl RecordingService {
    /// Returns the recorded call names.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) -> StorageResult<()> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.fail {
            return Err(BackendError::Unavailable {
                backend_name: "recording".to_string(),
                message: "offline".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn page(&self, request: &PageRequest) -> Page<ConsultationDto> {
        Page::new(self.records.clone(), request, self.total)
    }
}

#[async_trait]
impl ConsultationService for RecordingService {
    fn backend_name(&self) -> String {
        "recording".to_string()
    }

    async fn save(&self, dto: ConsultationDto) -> StorageResult<ConsultationDto> {
        self.record("save")?;
        Ok(ConsultationDto {
            id: Some(dto.id.unwrap_or(1)),
            ..dto
        })
    }

    async fn find_all(&self, request: &PageRequest) -> StorageResult<Page<ConsultationDto>> {
        self.record("find_all")?;
        Ok(self.page(request))
    }

    async fn find_one(&self, _id: i64) -> StorageResult<Option<ConsultationDto>> {
        self.record("find_one")?;
        Ok(None)
    }

    async fn delete(&self, _id: i64) -> StorageResult<()> {
        self.record("delete")
    }

    async fn search(
        &self,
        query: &str,
        request: &PageRequest,
    ) -> StorageResult<Page<ConsultationDto>> {
        self.record(&format!("search:{}", query))?;
        Ok(self.page(request))
    }
}

/// Creates a test server over `service`.
pub fn recording_server(service: RecordingService) -> TestServer {
    let app = create_app_with_config(service, ServerConfig::for_testing());
    TestServer::new(app).expect("Failed to create test server")
}
