//! Application state for the consultation REST API.
//!
//! Every handler receives the same [`AppState`]: the consultation service
//! and the immutable server configuration, both behind an `Arc`.

use std::sync::Arc;

use ayoos_persistence::core::ConsultationService;

use crate::config::ServerConfig;
use crate::responses::headers::AlertHeaders;

/// Shared application state for the REST API.
///
/// # Type Parameters
///
/// * `S` - The consultation service (must implement [`ConsultationService`])
///
/// # Example
///
/// ```rust,ignore
/// use ayoos_rest::{AppState, ServerConfig};
/// use ayoos_persistence::backends::sqlite::SqliteBackend;
/// use ayoos_persistence::DefaultConsultationService;
/// use std::sync::Arc;
///
/// let backend = SqliteBackend::in_memory()?;
/// backend.init_schema()?;
/// let service = DefaultConsultationService::new(backend.clone(), backend);
/// let state = AppState::new(Arc::new(service), ServerConfig::default());
/// ```
pub struct AppState<S> {
    /// The consultation service.
    service: Arc<S>,

    /// Server configuration.
    config: Arc<ServerConfig>,
}

// S sits behind an Arc and need not be Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: ConsultationService> AppState<S> {
    /// Creates a new AppState with the given service and configuration.
    pub fn new(service: Arc<S>, config: ServerConfig) -> Self {
        Self {
            service,
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the consultation service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Returns a clone of the service Arc.
    pub fn service_arc(&self) -> Arc<S> {
        Arc::clone(&self.service)
    }

    /// Returns a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the application name used in alert headers.
    pub fn application_name(&self) -> &str {
        &self.config.application_name
    }

    /// Returns whether alert headers carry translation keys.
    pub fn translation_enabled(&self) -> bool {
        self.config.enable_translation
    }

    /// Returns an alert header builder for this application.
    pub fn alerts(&self) -> AlertHeaders {
        AlertHeaders::from_config(&self.config)
    }

    /// Returns the API prefix without a trailing slash.
    pub fn api_prefix(&self) -> String {
        self.config.normalized_api_prefix()
    }

    /// Returns the base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Returns the default page size.
    pub fn default_page_size(&self) -> usize {
        self.config.default_page_size
    }

    /// Returns the maximum page size.
    pub fn max_page_size(&self) -> usize {
        self.config.max_page_size
    }
}
