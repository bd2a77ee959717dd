//! Consultation body extractor.
//!
//! Parses a JSON request body into a [`ConsultationDto`].

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, rejection::BytesRejection},
    http::header,
    response::{IntoResponse, Response},
};
use ayoos_persistence::types::ConsultationDto;
use serde_json::Value;

use crate::error::RestError;

/// Axum extractor for a consultation record in the request body.
///
/// The body must be a JSON object. `id` is optional and must be an integer
/// or null; every other member is kept as an attribute.
///
/// # Example
///
/// ```rust,ignore
/// use ayoos_rest::extractors::ConsultationBody;
///
/// async fn create(ConsultationBody(dto): ConsultationBody) {
///     assert!(dto.id.is_none());
/// }
/// ```
#[derive(Debug)]
pub struct ConsultationBody(pub ConsultationDto);

impl ConsultationBody {
    /// Consumes the extractor and returns the record.
    pub fn into_inner(self) -> ConsultationDto {
        self.0
    }
}

/// Error type for body extraction failures.
#[derive(Debug)]
pub enum ConsultationBodyRejection {
    /// JSON parsing failed.
    InvalidJson(String),
    /// The body is valid JSON but not an object.
    NotAnObject,
    /// Unsupported content type.
    UnsupportedMediaType(String),
    /// The body could not be read (too large, aborted).
    Body(BytesRejection),
}

impl IntoResponse for ConsultationBodyRejection {
    fn into_response(self) -> Response {
        let error = match self {
            ConsultationBodyRejection::InvalidJson(msg) => RestError::BadRequest {
                message: format!("Invalid JSON: {}", msg),
            },
            ConsultationBodyRejection::NotAnObject => RestError::BadRequest {
                message: "Consultation must be a JSON object".to_string(),
            },
            ConsultationBodyRejection::UnsupportedMediaType(ct) => {
                RestError::UnsupportedMediaType { content_type: ct }
            }
            ConsultationBodyRejection::Body(rejection) => return rejection.into_response(),
        };
        error.into_response()
    }
}

impl<S> FromRequest<S> for ConsultationBody
where
    S: Send + Sync,
{
    type Rejection = ConsultationBodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        // Must own the string before moving req
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();

        if !content_type.contains("json") {
            return Err(ConsultationBodyRejection::UnsupportedMediaType(
                content_type,
            ));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(ConsultationBodyRejection::Body)?;

        parse_body(&bytes).map(ConsultationBody)
    }
}

/// Parses raw body bytes into a record.
fn parse_body(bytes: &[u8]) -> Result<ConsultationDto, ConsultationBodyRejection> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ConsultationBodyRejection::InvalidJson(e.to_string()))?;

    if !value.is_object() {
        return Err(ConsultationBodyRejection::NotAnObject);
    }

    serde_json::from_value(value).map_err(|e| ConsultationBodyRejection::InvalidJson(e.to_string()))
}
