//! ConsultationSearchIndex implementation for Elasticsearch.

use async_trait::async_trait;
use chrono::Utc;
use elasticsearch::{DeleteParts, IndexParts, SearchParts};
use serde_json::{Value, json};

use crate::core::{
    ConsultationSearchIndex, SearchQuery, SearchTerm, validate_sort_property,
};
use crate::error::{StorageError, StorageResult, ValidationError};
use crate::types::{ConsultationDto, Page, PageRequest, SortDirection};

use super::backend::ElasticsearchIndex;

fn internal_error(message: String) -> StorageError {
    crate::error::internal_error("elasticsearch", message)
}

/// Builds the document stored for a record.
pub(crate) fn build_document(id: i64, dto: &ConsultationDto) -> Value {
    json!({
        "consultation_id": id,
        "indexed_at": Utc::now().to_rfc3339(),
        "attributes": dto.attributes,
        "content_text": dto.searchable_text(),
    })
}

/// Escapes characters reserved by the query_string syntax.
fn escape_query_string(text: &str) -> String {
    const RESERVED: &[char] = &[
        '+', '-', '=', '&', '|', '>', '<', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~',
        '*', '?', ':', '\\', '/',
    ];
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Builds a query_string expression matching any of the terms.
pub(crate) fn query_string(terms: &[SearchTerm]) -> String {
    terms
        .iter()
        .map(|term| {
            let escaped = escape_query_string(&term.text);
            if term.prefix {
                format!("{}*", escaped)
            } else {
                escaped
            }
        })
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Builds the sort clause: relevance then id when unsorted, otherwise the
/// requested orders with id as the final tie-breaker.
pub(crate) fn build_sort(request: &PageRequest) -> StorageResult<Vec<Value>> {
    if request.is_unsorted() {
        return Ok(vec![
            json!({ "_score": { "order": "desc" } }),
            json!({ "consultation_id": { "order": "asc" } }),
        ]);
    }

    let mut sort = Vec::with_capacity(request.sort.len() + 1);
    let mut sorts_on_id = false;
    for order in &request.sort {
        validate_sort_property(&order.property)?;
        let direction = match order.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        if order.property == "id" {
            sorts_on_id = true;
            sort.push(json!({ "consultation_id": { "order": direction } }));
        } else {
            let field = format!("attributes.{}", order.property);
            sort.push(json!({
                field: {
                    "order": direction,
                    "unmapped_type": "keyword",
                    "missing": "_last"
                }
            }));
        }
    }
    if !sorts_on_id {
        sort.push(json!({ "consultation_id": { "order": "asc" } }));
    }
    Ok(sort)
}

/// Default `index.max_result_window`; `from + size` may not exceed it.
pub(crate) const MAX_RESULT_WINDOW: usize = 10_000;

/// Returns `from` and `size` for a page, kept inside the result window.
///
/// A page starting past the window is fetched with size 0, which still
/// reports the total hit count.
pub(crate) fn result_window(request: &PageRequest) -> (usize, usize) {
    let offset = request.offset();
    if offset >= MAX_RESULT_WINDOW {
        (0, 0)
    } else {
        (offset, request.size.min(MAX_RESULT_WINDOW - offset))
    }
}

/// Builds the full search request body.
pub(crate) fn build_search_body(
    query: &SearchQuery,
    request: &PageRequest,
) -> StorageResult<Value> {
    let es_query = match query {
        SearchQuery::MatchAll => json!({ "match_all": {} }),
        SearchQuery::Terms(terms) => json!({
            "query_string": {
                "query": query_string(terms),
                "fields": ["content_text"],
                "default_operator": "OR",
                "analyze_wildcard": true
            }
        }),
    };

    let (from, size) = result_window(request);
    Ok(json!({
        "query": es_query,
        "from": from,
        "size": size,
        "track_total_hits": true,
        "sort": build_sort(request)?,
    }))
}

fn parse_hit(hit: &Value) -> Option<ConsultationDto> {
    let source = hit.get("_source")?;
    let id = source.get("consultation_id")?.as_i64()?;
    let attributes = source
        .get("attributes")
        .and_then(|a| a.as_object())
        .cloned()
        .unwrap_or_default();
    Some(ConsultationDto {
        id: Some(id),
        attributes,
    })
}

#[async_trait]
impl ConsultationSearchIndex for ElasticsearchIndex {
    fn backend_name(&self) -> &'static str {
        "elasticsearch"
    }

    async fn index(&self, dto: &ConsultationDto) -> StorageResult<()> {
        let id = dto.id.ok_or_else(|| ValidationError::InvalidRecord {
            message: "cannot index a consultation without an id".to_string(),
        })?;

        let index = self.index_name();
        let doc_id = id.to_string();
        let response = self
            .client()
            .index(IndexParts::IndexId(&index, &doc_id))
            .body(build_document(id, dto))
            .send()
            .await
            .map_err(|e| internal_error(format!("Failed to index document: {}", e)))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(internal_error(format!(
                "Failed to index document (status {}): {}",
                status, body
            )));
        }

        tracing::debug!(id, index = %index, "Indexed consultation");
        Ok(())
    }

    async fn remove(&self, id: i64) -> StorageResult<()> {
        let index = self.index_name();
        let doc_id = id.to_string();

        let response = self
            .client()
            .delete(DeleteParts::IndexId(&index, &doc_id))
            .send()
            .await
            .map_err(|e| internal_error(format!("Failed to delete document: {}", e)))?;

        let status = response.status_code();
        if !status.is_success() && status.as_u16() != 404 {
            let body = response.text().await.unwrap_or_default();
            return Err(internal_error(format!(
                "Failed to delete document (status {}): {}",
                status, body
            )));
        }

        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        request: &PageRequest,
    ) -> StorageResult<Page<ConsultationDto>> {
        let parsed = SearchQuery::parse(query)?;
        let body = build_search_body(&parsed, request)?;
        let index = self.index_name();

        let response = self
            .client()
            .search(SearchParts::Index(&[&index]))
            .body(body)
            .send()
            .await
            .map_err(|e| internal_error(format!("Search request failed: {}", e)))?;

        if !response.status_code().is_success() {
            let body = response.text().await.unwrap_or_default();
            // Nothing indexed yet
            if body.contains("index_not_found_exception") {
                return Ok(Page::empty(request));
            }
            return Err(internal_error(format!("Search failed: {}", body)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| internal_error(format!("Failed to parse search response: {}", e)))?;

        let total = body
            .get("hits")
            .and_then(|h| h.get("total"))
            .and_then(|t| t.get("value"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let content: Vec<ConsultationDto> = body
            .get("hits")
            .and_then(|h| h.get("hits"))
            .and_then(|h| h.as_array())
            .map(|hits| hits.iter().filter_map(parse_hit).collect())
            .unwrap_or_default();

        Ok(Page::new(content, request, total))
    }
}
