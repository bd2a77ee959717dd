//! ConsultationRepository implementation for SQLite.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use crate::core::{ConsultationRepository, validate_sort_property};
use crate::error::{ResourceError, StorageError, StorageResult};
use crate::types::{ConsultationDto, Page, PageRequest, SortOrder};

use super::SqliteBackend;

fn internal_error(message: String) -> StorageError {
    crate::error::internal_error("sqlite", message)
}

/// Turns a stored row into a record, reporting unreadable JSON as corrupt.
pub(super) fn row_to_dto(id: i64, data: &str) -> StorageResult<ConsultationDto> {
    ConsultationDto::from_stored(id, data).map_err(|e| {
        StorageError::Resource(ResourceError::Corrupt {
            entity: "consultation".to_string(),
            id,
            message: e.to_string(),
        })
    })
}

/// Builds an ORDER BY list for the requested sort orders.
///
/// `id` sorts on `id_column`; any other property sorts on the JSON attribute
/// of the same name in `data`. The id column is appended ascending as the
/// final tie-breaker unless the request already sorts on it.
pub(super) fn order_by_clause(sort: &[SortOrder], id_column: &str) -> StorageResult<String> {
    let mut parts = Vec::with_capacity(sort.len() + 1);
    let mut sorts_on_id = false;

    for order in sort {
        validate_sort_property(&order.property)?;
        if order.property == "id" {
            sorts_on_id = true;
            parts.push(format!("{} {}", id_column, order.direction.as_sql()));
        } else {
            parts.push(format!(
                "json_extract(data, '$.{}') {}",
                order.property,
                order.direction.as_sql()
            ));
        }
    }

    if !sorts_on_id {
        parts.push(format!("{} ASC", id_column));
    }

    Ok(parts.join(", "))
}

/// Inserts a row and returns its generated id.
fn insert_consultation(conn: &rusqlite::Connection, data: &str, now: &str) -> StorageResult<i64> {
    conn.execute(
        "INSERT INTO consultations (data, created_at, last_updated) VALUES (?1, ?2, ?2)",
        params![data, now],
    )
    .map_err(|e| internal_error(format!("Failed to insert consultation: {}", e)))?;
    Ok(conn.last_insert_rowid())
}

#[async_trait]
impl ConsultationRepository for SqliteBackend {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn save(&self, dto: ConsultationDto) -> StorageResult<ConsultationDto> {
        let conn = self.get_connection()?;
        let data = dto.attributes_json()?;
        let now = Utc::now().to_rfc3339();

        let id = match dto.id {
            None => insert_consultation(&conn, &data, &now)?,
            Some(id) => {
                let updated = conn
                    .execute(
                        "UPDATE consultations SET data = ?1, last_updated = ?2 WHERE id = ?3",
                        params![data, now, id],
                    )
                    .map_err(|e| internal_error(format!("Failed to update consultation: {}", e)))?;

                // Ids are never client-assigned; an unknown id gets a fresh one
                if updated == 0 {
                    let generated = insert_consultation(&conn, &data, &now)?;
                    tracing::debug!(requested = id, id = generated, "Unknown id, inserted");
                    generated
                } else {
                    id
                }
            }
        };

        tracing::debug!(id, "Saved consultation");

        Ok(ConsultationDto {
            id: Some(id),
            attributes: dto.attributes,
        })
    }

    async fn find_by_id(&self, id: i64) -> StorageResult<Option<ConsultationDto>> {
        let conn = self.get_connection()?;

        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM consultations WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| internal_error(format!("Failed to read consultation: {}", e)))?;

        data.map(|data| row_to_dto(id, &data)).transpose()
    }

    async fn find_all(&self, request: &PageRequest) -> StorageResult<Page<ConsultationDto>> {
        let order_by = order_by_clause(&request.sort, "id")?;
        let conn = self.get_connection()?;

        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM consultations", [], |row| row.get(0))
            .map_err(|e| internal_error(format!("Failed to count consultations: {}", e)))?;

        let sql = format!(
            "SELECT id, data FROM consultations ORDER BY {} LIMIT ?1 OFFSET ?2",
            order_by
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| internal_error(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(
                params![request.sql_limit(), request.sql_offset()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .map_err(|e| internal_error(format!("Failed to query consultations: {}", e)))?;

        let mut content = Vec::new();
        for row in rows {
            let (id, data) =
                row.map_err(|e| internal_error(format!("Failed to read row: {}", e)))?;
            content.push(row_to_dto(id, &data)?);
        }

        Ok(Page::new(content, request, total as u64))
    }

    async fn delete_by_id(&self, id: i64) -> StorageResult<()> {
        let conn = self.get_connection()?;

        let deleted = conn
            .execute("DELETE FROM consultations WHERE id = ?1", params![id])
            .map_err(|e| internal_error(format!("Failed to delete consultation: {}", e)))?;

        tracing::debug!(id, deleted, "Deleted consultation");
        Ok(())
    }

    async fn count(&self) -> StorageResult<u64> {
        let conn = self.get_connection()?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM consultations", [], |row| row.get(0))
            .map_err(|e| internal_error(format!("Failed to count consultations: {}", e)))?;

        Ok(count as u64)
    }
}
