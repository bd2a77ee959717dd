//! ConsultationSearchIndex implementation for SQLite.
//!
//! With FTS5 available, documents live in the `consultation_fts` virtual
//! table and unsorted results are ranked with bm25. Otherwise documents live
//! in `consultation_search` with a normalized text column, matched with
//! `LIKE` and ranked by the number of matching terms.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params, params_from_iter};

use crate::core::{ConsultationSearchIndex, SearchQuery, SearchTerm};
use crate::error::{StorageError, StorageResult, ValidationError};
use crate::types::{ConsultationDto, Page, PageRequest};

use super::SqliteBackend;
use super::repository::{order_by_clause, row_to_dto};

fn internal_error(message: String) -> StorageError {
    crate::error::internal_error("sqlite", message)
}

/// Lowercases text and reduces it to space-separated words, padded with a
/// leading and trailing space so every word can be matched as `% word %`.
pub(crate) fn normalize_content(text: &str) -> String {
    let words: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                ' '
            }
        })
        .flat_map(char::to_lowercase)
        .collect();

    let mut normalized = String::with_capacity(words.len() + 2);
    normalized.push(' ');
    for word in words.split_whitespace() {
        normalized.push_str(word);
        normalized.push(' ');
    }
    normalized
}

/// Builds an FTS5 MATCH expression: each term quoted, prefix terms starred, OR-joined.
pub(crate) fn fts_match_expression(terms: &[SearchTerm]) -> String {
    terms
        .iter()
        .map(|term| {
            let quoted = format!("\"{}\"", term.text.replace('"', "\"\""));
            if term.prefix {
                format!("{}*", quoted)
            } else {
                quoted
            }
        })
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Builds a LIKE pattern against normalized content.
pub(crate) fn like_pattern(term: &SearchTerm) -> String {
    let escaped = term
        .text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    if term.prefix {
        format!("% {}%", escaped)
    } else {
        format!("% {} %", escaped)
    }
}

fn collect_page(
    conn: &Connection,
    count_sql: &str,
    select_sql: &str,
    mut args: Vec<SqlValue>,
    request: &PageRequest,
) -> StorageResult<Page<ConsultationDto>> {
    let total: i64 = conn
        .query_row(count_sql, params_from_iter(args.iter()), |row| row.get(0))
        .map_err(|e| internal_error(format!("Failed to count search results: {}", e)))?;

    args.push(SqlValue::Integer(request.sql_limit()));
    args.push(SqlValue::Integer(request.sql_offset()));

    let mut stmt = conn
        .prepare(select_sql)
        .map_err(|e| internal_error(format!("Failed to prepare search query: {}", e)))?;
    let rows = stmt
        .query_map(params_from_iter(args.iter()), |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(|e| internal_error(format!("Failed to execute search: {}", e)))?;

    let mut content = Vec::new();
    for row in rows {
        let (id, data) =
            row.map_err(|e| internal_error(format!("Failed to read search row: {}", e)))?;
        content.push(row_to_dto(id, &data)?);
    }

    Ok(Page::new(content, request, total as u64))
}

impl SqliteBackend {
    fn search_fts(
        &self,
        query: &SearchQuery,
        request: &PageRequest,
    ) -> StorageResult<Page<ConsultationDto>> {
        let conn = self.get_connection()?;

        let (filter, relevance, args) = match query {
            SearchQuery::MatchAll => (String::new(), None, Vec::new()),
            SearchQuery::Terms(terms) => (
                "WHERE consultation_fts MATCH ?1".to_string(),
                Some("rank"),
                vec![SqlValue::Text(fts_match_expression(terms))],
            ),
        };

        let order_by = match (request.is_unsorted(), relevance) {
            (true, Some(rank)) => format!("{}, doc_id ASC", rank),
            _ => order_by_clause(&request.sort, "doc_id")?,
        };

        let limit_index = args.len() + 1;
        let count_sql = format!("SELECT COUNT(*) FROM consultation_fts {}", filter);
        let select_sql = format!(
            "SELECT doc_id, data FROM consultation_fts {} ORDER BY {} LIMIT ?{} OFFSET ?{}",
            filter,
            order_by,
            limit_index,
            limit_index + 1
        );

        collect_page(&conn, &count_sql, &select_sql, args, request)
    }

    fn search_like(
        &self,
        query: &SearchQuery,
        request: &PageRequest,
    ) -> StorageResult<Page<ConsultationDto>> {
        let conn = self.get_connection()?;

        let terms = query.terms();
        let args: Vec<SqlValue> = terms
            .iter()
            .map(|term| SqlValue::Text(like_pattern(term)))
            .collect();

        let (filter, score) = if terms.is_empty() {
            (String::new(), "0".to_string())
        } else {
            let conditions: Vec<String> = (1..=terms.len())
                .map(|i| format!("content LIKE ?{} ESCAPE '\\'", i))
                .collect();
            let score = conditions
                .iter()
                .map(|c| format!("(CASE WHEN {} THEN 1 ELSE 0 END)", c))
                .collect::<Vec<_>>()
                .join(" + ");
            (format!("WHERE {}", conditions.join(" OR ")), score)
        };

        let order_by = if request.is_unsorted() {
            "score DESC, doc_id ASC".to_string()
        } else {
            order_by_clause(&request.sort, "doc_id")?
        };

        let limit_index = args.len() + 1;
        let count_sql = format!("SELECT COUNT(*) FROM consultation_search {}", filter);
        let select_sql = format!(
            "SELECT doc_id, data, {} AS score FROM consultation_search {} ORDER BY {} LIMIT ?{} OFFSET ?{}",
            score,
            filter,
            order_by,
            limit_index,
            limit_index + 1
        );

        collect_page(&conn, &count_sql, &select_sql, args, request)
    }
}

#[async_trait]
impl ConsultationSearchIndex for SqliteBackend {
    fn backend_name(&self) -> &'static str {
        if self.fts_enabled() {
            "sqlite-fts5"
        } else {
            "sqlite-like"
        }
    }

    async fn index(&self, dto: &ConsultationDto) -> StorageResult<()> {
        let id = dto.id.ok_or_else(|| ValidationError::InvalidRecord {
            message: "cannot index a consultation without an id".to_string(),
        })?;
        let data = dto.attributes_json()?;
        let text = dto.searchable_text();

        let mut conn = self.get_connection()?;

        if self.fts_enabled() {
            let tx = conn
                .transaction()
                .map_err(|e| internal_error(format!("Failed to begin transaction: {}", e)))?;
            tx.execute("DELETE FROM consultation_fts WHERE doc_id = ?1", params![id])
                .map_err(|e| internal_error(format!("Failed to clear FTS entry: {}", e)))?;
            tx.execute(
                "INSERT INTO consultation_fts (doc_id, data, content) VALUES (?1, ?2, ?3)",
                params![id, data, text],
            )
            .map_err(|e| internal_error(format!("Failed to insert FTS entry: {}", e)))?;
            tx.commit()
                .map_err(|e| internal_error(format!("Failed to commit FTS entry: {}", e)))?;
        } else {
            conn.execute(
                "INSERT INTO consultation_search (doc_id, data, content, indexed_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(doc_id) DO UPDATE SET
                    data = excluded.data,
                    content = excluded.content,
                    indexed_at = excluded.indexed_at",
                params![id, data, normalize_content(&text), Utc::now().to_rfc3339()],
            )
            .map_err(|e| internal_error(format!("Failed to index consultation: {}", e)))?;
        }

        tracing::debug!(id, "Indexed consultation");
        Ok(())
    }

    async fn remove(&self, id: i64) -> StorageResult<()> {
        let conn = self.get_connection()?;

        let table = if self.fts_enabled() {
            "consultation_fts"
        } else {
            "consultation_search"
        };
        conn.execute(
            &format!("DELETE FROM {} WHERE doc_id = ?1", table),
            params![id],
        )
        .map_err(|e| internal_error(format!("Failed to remove indexed consultation: {}", e)))?;

        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        request: &PageRequest,
    ) -> StorageResult<Page<ConsultationDto>> {
        let parsed = SearchQuery::parse(query)?;
        tracing::debug!(query, ?parsed, "Searching consultations");

        if self.fts_enabled() {
            self.search_fts(&parsed, request)
        } else {
            self.search_like(&parsed, request)
        }
    }
}
