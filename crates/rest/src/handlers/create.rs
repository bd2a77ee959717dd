//! Create handler: `POST {api}/consultations`

use axum::{
    Json,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use ayoos_persistence::core::ConsultationService;
use ayoos_persistence::types::ENTITY_NAME;
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::extractors::ConsultationBody;
use crate::state::AppState;

/// Handler for creating a consultation.
///
/// The identifier is assigned by the store, so a body that already carries
/// one is rejected before the service is called.
///
/// # Response
///
/// - `201 Created` - body is the saved record, `Location` points at it
/// - `400 Bad Request` - the record already has an id (`idexists`)
pub async fn create_handler<S>(
    State(state): State<AppState<S>>,
    ConsultationBody(dto): ConsultationBody,
) -> RestResult<Response>
where
    S: ConsultationService + 'static,
{
    debug!(consultation = ?dto, "REST request to save Consultation");

    if dto.id.is_some() {
        return Err(RestError::bad_request_alert(
            &state.alerts(),
            "A new consultation cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }

    let saved = state.service().save(dto).await?;
    let id = saved.id.ok_or_else(|| RestError::InternalError {
        message: "Saved consultation has no id".to_string(),
    })?;

    let location = format!("{}/consultations/{}", state.api_prefix(), id);
    let mut headers = state.alerts().entity_creation(ENTITY_NAME, &id.to_string());
    let location = HeaderValue::from_str(&location).map_err(|_| RestError::InternalError {
        message: format!("Invalid Location header: {}", location),
    })?;
    headers.insert(header::LOCATION, location);

    debug!(id, "Consultation created");

    Ok((StatusCode::CREATED, headers, Json(saved)).into_response())
}
