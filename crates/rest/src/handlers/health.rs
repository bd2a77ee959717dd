//! Health check endpoint handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ayoos_persistence::core::ConsultationService;
use ayoos_persistence::types::PageRequest;
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// `GET /health` - status, backend name and current time.
pub async fn health_handler<S>(State(state): State<AppState<S>>) -> RestResult<Response>
where
    S: ConsultationService + 'static,
{
    debug!("Processing health check request");

    let health_response = serde_json::json!({
        "status": "healthy",
        "backend": state.service().backend_name(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    Ok((StatusCode::OK, Json(health_response)).into_response())
}

/// Liveness probe: `GET /_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe: `GET /_readiness`
///
/// Reads a one-element page through the service; any failure answers
/// `503 Service Unavailable`.
pub async fn readiness_handler<S>(State(state): State<AppState<S>>) -> RestResult<Response>
where
    S: ConsultationService + 'static,
{
    debug!("Processing readiness check request");

    let backend_name = state.service().backend_name();
    if let Err(e) = state.service().find_all(&PageRequest::new(0, 1)).await {
        tracing::warn!(error = %e, backend = %backend_name, "Readiness check failed");
        return Err(RestError::ServiceUnavailable {
            message: format!("Storage not ready: {}", e),
        });
    }

    let response = serde_json::json!({
        "status": "ready",
        "backend": backend_name,
        "checks": {
            "storage": "ok"
        }
    });

    Ok((StatusCode::OK, Json(response)).into_response())
}
