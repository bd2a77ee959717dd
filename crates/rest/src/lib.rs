//! # ayoos-rest - Consultation REST API
//!
//! HTTP layer of the Ayoos consultation service: create, update, read,
//! delete and search consultation records through a
//! [`ConsultationService`](ayoos_persistence::core::ConsultationService).
//!
//! The handlers check identifier presence, delegate to the service, and
//! shape the response: status code, `Location`, alert headers and
//! pagination headers.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ayoos_rest::{create_app_with_config, ServerConfig};
//! use ayoos_persistence::backends::sqlite::SqliteBackend;
//! use ayoos_persistence::DefaultConsultationService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = SqliteBackend::open("consultation.db")?;
//!     backend.init_schema()?;
//!     let service = DefaultConsultationService::new(backend.clone(), backend);
//!
//!     let config = ServerConfig::default();
//!     let app = create_app_with_config(service, config.clone());
//!
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## API Endpoints
//!
//! | Operation | HTTP Method | URL Pattern | Success |
//! |-----------|-------------|-------------|---------|
//! | create | POST | `/api/consultations` | 201 + `Location` |
//! | update | PUT | `/api/consultations` | 200 |
//! | read page | GET | `/api/consultations` | 200 + pagination headers |
//! | read one | GET | `/api/consultations/{id}` | 200, or 404 with empty body |
//! | delete | DELETE | `/api/consultations/{id}` | 204 |
//! | search | GET | `/api/_search/consultations?query=` | 200 + pagination headers |
//! | health | GET | `/health`, `/_liveness`, `/_readiness` | 200 |
//!
//! ## Response Headers
//!
//! - `X-{app}-alert` / `X-{app}-params` - notification for create, update and delete
//! - `X-{app}-error` - reason key of a rejected request
//! - `X-Total-Count`, `X-Total-Pages`, `Link` - pagination metadata
//!
//! ## Configuration
//!
//! See [`config`] for every option and its `CONSULTATION_*` variable.
//!
//! ## Architecture
//!
//! - [`error`] - Error types and problem JSON rendering
//! - [`config`] - Server configuration
//! - [`state`] - Application state (service, configuration)
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request ID middleware
//! - [`extractors`] - Body and pagination extractors
//! - [`responses`] - Alert and pagination headers
//! - [`routing`] - Route configuration

// Enforce documentation
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod responses;
pub mod routing;
pub mod state;

// Re-export commonly used types
pub use config::{SearchBackendMode, ServerConfig};
pub use error::{RestError, RestResult};
pub use state::AppState;

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, extract::DefaultBodyLimit, http::StatusCode};
use ayoos_persistence::core::ConsultationService;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the Axum application with default configuration.
///
/// For more control, use [`create_app_with_config`].
pub fn create_app<S>(service: S) -> Router
where
    S: ConsultationService + 'static,
{
    create_app_with_config(service, ServerConfig::default())
}

/// Creates the Axum application with custom configuration.
///
/// Installs the routes, request tracing, the request timeout, the body size
/// limit, and optionally CORS and request IDs.
///
/// # Example
///
/// ```rust,ignore
/// use ayoos_rest::{create_app_with_config, ServerConfig};
///
/// let config = ServerConfig {
///     api_prefix: "/v1".to_string(),
///     ..Default::default()
/// };
/// let app = create_app_with_config(service, config);
/// ```
pub fn create_app_with_config<S>(service: S, config: ServerConfig) -> Router
where
    S: ConsultationService + 'static,
{
    info!(
        backend = %service.backend_name(),
        api_prefix = %config.normalized_api_prefix(),
        "Creating consultation REST API"
    );

    // Create application state
    let state = AppState::new(Arc::new(service), config.clone());

    // Build the router with all consultation routes
    let router = routing::consultation_routes::create_routes(state)
        .layer(DefaultBodyLimit::max(config.max_body_size));

    // Build middleware stack
    let service_builder = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout),
        ));

    // Add CORS if enabled
    let router = if config.enable_cors {
        router.layer(build_cors_layer(&config))
    } else {
        router
    };

    let router = router.layer(service_builder);

    if config.enable_request_id {
        middleware::with_request_id(router)
    } else {
        router
    }
}

/// Builds the CORS layer based on configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let mut cors = CorsLayer::new();

    if config.cors_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_origin(origins);
    }

    if config.cors_methods == "*" {
        cors = cors.allow_methods(Any);
    } else {
        let methods: Vec<_> = config
            .cors_methods
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_methods(methods);
    }

    if config.cors_headers == "*" {
        cors = cors.allow_headers(Any);
    } else {
        let headers: Vec<_> = config
            .cors_headers
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors = cors.allow_headers(headers);
    }

    // Clients read the alert and pagination headers
    cors.expose_headers(Any)
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` overrides `level` when set. Call once at startup.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ayoos_rest={level},ayoos_persistence={level},consultation={level},tower_http=debug"
        ))
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
