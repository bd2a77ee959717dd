//! Delete handler: `DELETE {api}/consultations/{id}`

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ayoos_persistence::core::ConsultationService;
use ayoos_persistence::types::ENTITY_NAME;
use tracing::debug;

use crate::error::RestResult;
use crate::state::AppState;

/// Handler for deleting a consultation.
///
/// Deleting an id that does not exist still answers `204 No Content`.
pub async fn delete_handler<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> RestResult<Response>
where
    S: ConsultationService + 'static,
{
    debug!(id, "REST request to delete Consultation");

    state.service().delete(id).await?;
    let headers = state.alerts().entity_deletion(ENTITY_NAME, &id.to_string());

    Ok((StatusCode::NO_CONTENT, headers).into_response())
}
