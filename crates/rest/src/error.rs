//! Error types for the consultation REST API.
//!
//! Every error renders as a problem JSON body (`application/problem+json`).
//!
//! # Error Mapping
//!
//! | Error | HTTP Status | `message` |
//! |-------|-------------|-----------|
//! | BadRequestAlert | 400 | `error.{errorKey}` |
//! | BadRequest | 400 | `error.http.400` |
//! | UnsupportedMediaType | 415 | `error.http.415` |
//! | InternalError | 500 | `error.http.500` |
//! | ServiceUnavailable | 503 | `error.http.503` |
//!
//! Storage validation and query parse failures become `BadRequest`; every
//! other storage failure is an `InternalError`.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use ayoos_persistence::error::{ResourceError, SearchError, StorageError};
use serde_json::{Value, json};
use std::fmt;

use crate::responses::headers::AlertHeaders;

/// The primary error type for REST API operations.
#[derive(Debug)]
pub enum RestError {
    /// Bad request that also carries failure alert headers (HTTP 400).
    BadRequestAlert {
        /// Application name for the alert header prefix.
        application_name: String,
        /// Whether the alert header carries a translation key.
        enable_translation: bool,
        /// Default, human-readable message.
        message: String,
        /// Entity the request was about.
        entity_name: String,
        /// Reason code, such as `idexists`.
        error_key: String,
    },

    /// Bad request - malformed input (HTTP 400).
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Unsupported media type (HTTP 415).
    UnsupportedMediaType {
        /// The unsupported content type.
        content_type: String,
    },

    /// Internal server error (HTTP 500).
    InternalError {
        /// Error message.
        message: String,
    },

    /// A dependency is not ready (HTTP 503).
    ServiceUnavailable {
        /// Error message.
        message: String,
    },
}

impl RestError {
    /// Creates a [`RestError::BadRequestAlert`] using the alert settings of
    /// `alerts`.
    pub fn bad_request_alert(
        alerts: &AlertHeaders,
        message: impl Into<String>,
        entity_name: impl Into<String>,
        error_key: impl Into<String>,
    ) -> Self {
        RestError::BadRequestAlert {
            application_name: alerts.application_name().to_string(),
            enable_translation: alerts.translation_enabled(),
            message: message.into(),
            entity_name: entity_name.into(),
            error_key: error_key.into(),
        }
    }

    /// Returns the HTTP status code of this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::BadRequestAlert { .. } | RestError::BadRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            RestError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RestError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl fmt::Display for RestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestError::BadRequestAlert {
                message,
                entity_name,
                error_key,
                ..
            } => {
                write!(f, "Bad request ({}.{}): {}", entity_name, error_key, message)
            }
            RestError::BadRequest { message } => {
                write!(f, "Bad request: {}", message)
            }
            RestError::UnsupportedMediaType { content_type } => {
                write!(f, "Unsupported media type: {}", content_type)
            }
            RestError::InternalError { message } => {
                write!(f, "Internal error: {}", message)
            }
            RestError::ServiceUnavailable { message } => {
                write!(f, "Service unavailable: {}", message)
            }
        }
    }
}

impl std::error::Error for RestError {}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let (body, alert_headers) = match &self {
            RestError::BadRequestAlert {
                application_name,
                enable_translation,
                message,
                entity_name,
                error_key,
            } => {
                let body = json!({
                    "entityName": entity_name,
                    "errorKey": error_key,
                    "type": "about:blank",
                    "title": message,
                    "status": status.as_u16(),
                    "message": format!("error.{}", error_key),
                    "params": entity_name,
                });
                let headers = AlertHeaders::new(application_name.clone(), *enable_translation)
                    .failure(entity_name, error_key, message);
                (body, Some(headers))
            }
            RestError::BadRequest { message }
            | RestError::InternalError { message }
            | RestError::ServiceUnavailable { message } => (problem(status, message), None),
            RestError::UnsupportedMediaType { .. } => (problem(status, &self.to_string()), None),
        };

        let mut response = (status, Json(body)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        if let Some(alert_headers) = alert_headers {
            response.headers_mut().extend(alert_headers);
        }
        response
    }
}

/// Creates a generic problem body for `status`.
fn problem(status: StatusCode, detail: &str) -> Value {
    json!({
        "type": "about:blank",
        "title": status.canonical_reason().unwrap_or("Error"),
        "status": status.as_u16(),
        "detail": detail,
        "message": format!("error.http.{}", status.as_u16()),
    })
}

// Conversions from storage errors

impl From<StorageError> for RestError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Resource(e) => e.into(),
            StorageError::Validation(e) => RestError::BadRequest {
                message: e.to_string(),
            },
            StorageError::Search(e) => e.into(),
            StorageError::Backend(e) => RestError::InternalError {
                message: e.to_string(),
            },
        }
    }
}

impl From<ResourceError> for RestError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::Corrupt { .. } => RestError::InternalError {
                message: err.to_string(),
            },
        }
    }
}

impl From<SearchError> for RestError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::QueryParseError { .. } => RestError::BadRequest {
                message: err.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for RestError {
    fn from(err: serde_json::Error) -> Self {
        RestError::BadRequest {
            message: format!("Invalid JSON: {}", err),
        }
    }
}

/// Result type alias for REST operations.
pub type RestResult<T> = Result<T, RestError>;
