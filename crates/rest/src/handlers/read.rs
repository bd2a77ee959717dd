//! Read handlers: `GET {api}/consultations` and `GET {api}/consultations/{id}`

use axum::{
    Json,
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ayoos_persistence::core::ConsultationService;
use tracing::debug;

use crate::error::RestResult;
use crate::extractors::Pageable;
use crate::responses::pagination::pagination_headers;
use crate::state::AppState;

/// Handler for listing consultations one page at a time.
///
/// The body is the page content; totals and navigation links are in the
/// pagination headers.
pub async fn get_all_handler<S>(
    State(state): State<AppState<S>>,
    OriginalUri(uri): OriginalUri,
    Pageable(request): Pageable,
) -> RestResult<Response>
where
    S: ConsultationService + 'static,
{
    debug!(
        page = request.page,
        size = request.size,
        "REST request to get a page of Consultations"
    );

    let page = state.service().find_all(&request).await?;
    let headers = pagination_headers(state.base_url(), &uri, &page);

    Ok((StatusCode::OK, headers, Json(page.content)).into_response())
}

/// Handler for reading one consultation.
///
/// # Response
///
/// - `200 OK` - the stored record
/// - `404 Not Found` - no record with that id, empty body
pub async fn get_one_handler<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> RestResult<Response>
where
    S: ConsultationService + 'static,
{
    debug!(id, "REST request to get Consultation");

    match state.service().find_one(id).await? {
        Some(dto) => Ok((StatusCode::OK, Json(dto)).into_response()),
        None => {
            debug!(id, "Consultation not found");
            Ok(StatusCode::NOT_FOUND.into_response())
        }
    }
}
