//! Pagination response headers.
//!
//! Paged listings answer with the page content as the body and the page
//! metadata in headers:
//!
//! - `X-Total-Count` - total number of elements
//! - `X-Total-Pages` - total number of pages
//! - `Link` - `next`, `prev`, `last` and `first` page URLs

use ayoos_persistence::types::Page;
use http::{HeaderMap, HeaderName, HeaderValue, Uri, header};
use url::Url;

/// Header carrying the total number of elements.
pub const X_TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");

/// Header carrying the total number of pages.
pub const X_TOTAL_PAGES: HeaderName = HeaderName::from_static("x-total-pages");

/// Builds the pagination headers for `page`, served at `uri`.
///
/// Link URLs are `base_url` followed by the request path and query, with
/// `page` and `size` replaced.
pub fn pagination_headers<T>(base_url: &str, uri: &Uri, page: &Page<T>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_TOTAL_COUNT, HeaderValue::from(page.total_elements));
    headers.insert(X_TOTAL_PAGES, HeaderValue::from(page.total_pages()));

    match link_header(base_url, uri, page) {
        Some(link) => {
            if let Ok(value) = HeaderValue::from_str(&link) {
                headers.insert(header::LINK, value);
            }
        }
        None => tracing::warn!(base_url = %base_url, uri = %uri, "Cannot build pagination links"),
    }

    headers
}

/// Builds the `Link` header value.
fn link_header<T>(base_url: &str, uri: &Uri, page: &Page<T>) -> Option<String> {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let current = Url::parse(&format!(
        "{}{}",
        base_url.trim_end_matches('/'),
        path_and_query
    ))
    .ok()?;

    let number = page.number as u64;
    let size = page.size;
    let total_pages = page.total_pages();
    let last_page = total_pages.saturating_sub(1);

    let mut links = Vec::with_capacity(4);
    if page.has_next() {
        links.push(page_link(&current, number + 1, size, "next"));
    }
    if page.has_previous() {
        links.push(page_link(&current, number - 1, size, "prev"));
    }
    links.push(page_link(&current, last_page, size, "last"));
    links.push(page_link(&current, 0, size, "first"));

    Some(links.join(","))
}

fn page_link(current: &Url, page: u64, size: usize, rel: &str) -> String {
    format!("<{}>; rel=\"{}\"", with_page(current, page, size), rel)
}

/// Returns `url` with the `page` and `size` query parameters replaced.
fn with_page(url: &Url, page: u64, size: usize) -> Url {
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "page" && k != "size")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = url.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("page", &page.to_string())
        .append_pair("size", &size.to_string());
    url
}
