//! Search handler: `GET {api}/_search/consultations?query=...`
//!
//! Query syntax is whitespace-separated terms, any of which may match; a
//! trailing `*` turns a term into a prefix match and `*` alone matches
//! everything.

use axum::{
    Json,
    extract::{OriginalUri, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ayoos_persistence::core::ConsultationService;
use serde::Deserialize;
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::extractors::Pageable;
use crate::responses::pagination::pagination_headers;
use crate::state::AppState;

/// Query parameters for search. Pagination is read by [`Pageable`].
#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
    /// The search query.
    pub query: Option<String>,
}

/// Handler for searching consultations.
///
/// # Response
///
/// - `200 OK` - body is the page of hits, with pagination headers
/// - `400 Bad Request` - `query` is missing or cannot be parsed
pub async fn search_handler<S>(
    State(state): State<AppState<S>>,
    OriginalUri(uri): OriginalUri,
    params: Result<Query<SearchParams>, QueryRejection>,
    Pageable(request): Pageable,
) -> RestResult<Response>
where
    S: ConsultationService + 'static,
{
    let Query(params) = params.map_err(|e| RestError::BadRequest {
        message: e.body_text(),
    })?;
    let query = params.query.ok_or_else(|| RestError::BadRequest {
        message: "Required request parameter 'query' is not present".to_string(),
    })?;

    debug!(
        query = %query,
        page = request.page,
        size = request.size,
        "REST request to search for a page of Consultations"
    );

    let page = state.service().search(&query, &request).await?;
    let headers = pagination_headers(state.base_url(), &uri, &page);

    Ok((StatusCode::OK, headers, Json(page.content)).into_response())
}
