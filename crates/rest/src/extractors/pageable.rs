//! Pagination extractor.
//!
//! Reads `page`, `size` and `sort` from the query string into a
//! [`PageRequest`].

use axum::{extract::FromRequestParts, http::request::Parts};
use ayoos_persistence::core::ConsultationService;
use ayoos_persistence::types::{PageRequest, SortOrder};

use crate::error::RestError;
use crate::state::AppState;

/// Axum extractor for pagination parameters.
///
/// - `page`: zero-based page index, default 0, negative values become 0
/// - `size`: page size, default from configuration, values below 1 fall back
///   to the default, values above the configured maximum are capped
/// - `sort`: repeatable, `property[,property...][,asc|desc]`
///
/// Non-numeric `page` or `size` values are rejected with 400.
///
/// # Example
///
/// ```rust,ignore
/// use ayoos_rest::extractors::Pageable;
///
/// async fn list_handler(pageable: Pageable) {
///     let request = pageable.into_inner();
///     println!("page {} of size {}", request.page, request.size);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Pageable(pub PageRequest);

impl Pageable {
    /// Parses pagination parameters from a raw query string.
    pub fn from_query(
        query: Option<&str>,
        default_size: usize,
        max_size: usize,
    ) -> Result<Self, RestError> {
        let mut page: Option<i64> = None;
        let mut size: Option<i64> = None;
        let mut sort = Vec::new();

        for (key, value) in url::form_urlencoded::parse(query.unwrap_or("").as_bytes()) {
            match key.as_ref() {
                "page" => page = Some(parse_number("page", &value)?),
                "size" => size = Some(parse_number("size", &value)?),
                "sort" => sort.extend(SortOrder::parse_param(&value)),
                _ => {}
            }
        }

        let page = page.unwrap_or(0).max(0) as usize;
        let size = match size {
            Some(size) if size >= 1 => (size as u64).min(max_size as u64) as usize,
            _ => default_size,
        };

        Ok(Pageable(PageRequest {
            page,
            size: size.max(1),
            sort,
        }))
    }

    /// Consumes the extractor and returns the page request.
    pub fn into_inner(self) -> PageRequest {
        self.0
    }
}

fn parse_number(name: &str, value: &str) -> Result<i64, RestError> {
    value.trim().parse().map_err(|_| RestError::BadRequest {
        message: format!("Invalid pagination parameter '{}': {}", name, value),
    })
}

impl<S> FromRequestParts<AppState<S>> for Pageable
where
    S: ConsultationService + 'static,
{
    type Rejection = RestError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        Pageable::from_query(
            parts.uri.query(),
            state.default_page_size(),
            state.max_page_size(),
        )
    }
}
