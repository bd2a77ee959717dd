//! Update handler: `PUT {api}/consultations`

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ayoos_persistence::core::ConsultationService;
use ayoos_persistence::types::ENTITY_NAME;
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::extractors::ConsultationBody;
use crate::state::AppState;

/// Handler for updating a consultation.
///
/// The record is identified by the `id` in the body. There is no existence
/// check here; saving an unknown id stores it under that id.
///
/// # Response
///
/// - `200 OK` - body is the saved record
/// - `400 Bad Request` - the record has no id (`idnull`)
pub async fn update_handler<S>(
    State(state): State<AppState<S>>,
    ConsultationBody(dto): ConsultationBody,
) -> RestResult<Response>
where
    S: ConsultationService + 'static,
{
    debug!(consultation = ?dto, "REST request to update Consultation");

    let Some(id) = dto.id else {
        return Err(RestError::bad_request_alert(
            &state.alerts(),
            "Invalid id",
            ENTITY_NAME,
            "idnull",
        ));
    };

    let saved = state.service().save(dto).await?;
    let headers = state.alerts().entity_update(ENTITY_NAME, &id.to_string());

    Ok((StatusCode::OK, headers, Json(saved)).into_response())
}
