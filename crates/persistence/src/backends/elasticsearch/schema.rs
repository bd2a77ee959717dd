//! Elasticsearch index mapping for consultation documents.

use elasticsearch::indices::{IndicesCreateParts, IndicesExistsParts};
use serde_json::json;

use crate::error::{BackendError, StorageError, StorageResult};

use super::backend::{ElasticsearchConfig, ElasticsearchIndex};

/// Creates the index settings and mapping.
///
/// - `consultation_id`: record id, used for sorting and tie-breaking
/// - `attributes`: the record attributes; strings are mapped as keywords so
///   they can be sorted on
/// - `content_text`: all searchable values joined, analyzed for full-text queries
pub fn create_index_mapping(config: &ElasticsearchConfig) -> serde_json::Value {
    json!({
        "settings": {
            "number_of_shards": config.number_of_shards,
            "number_of_replicas": config.number_of_replicas,
            "index.max_result_window": config.max_result_window,
            "refresh_interval": config.refresh_interval
        },
        "mappings": {
            "dynamic_templates": [
                {
                    "attribute_strings": {
                        "path_match": "attributes.*",
                        "match_mapping_type": "string",
                        "mapping": { "type": "keyword", "ignore_above": 256 }
                    }
                }
            ],
            "properties": {
                "consultation_id": { "type": "long" },
                "indexed_at": { "type": "date" },
                "attributes": { "type": "object", "dynamic": true },
                "content_text": {
                    "type": "text",
                    "analyzer": "standard"
                }
            }
        }
    })
}

fn internal_error(message: String) -> StorageError {
    crate::error::internal_error("elasticsearch", message)
}

/// Ensures the consultation index exists, creating it if necessary.
pub async fn ensure_index(backend: &ElasticsearchIndex) -> StorageResult<()> {
    let index = backend.index_name();

    let exists_response = backend
        .client()
        .indices()
        .exists(IndicesExistsParts::Index(&[&index]))
        .send()
        .await
        .map_err(|e| internal_error(format!("Failed to check index existence: {}", e)))?;

    if exists_response.status_code().is_success() {
        return Ok(());
    }

    let mapping = create_index_mapping(backend.config());

    let response = backend
        .client()
        .indices()
        .create(IndicesCreateParts::Index(&index))
        .body(mapping)
        .send()
        .await
        .map_err(|e| internal_error(format!("Failed to create index {}: {}", index, e)))?;

    let status = response.status_code();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        // Another writer created it first
        if body.contains("resource_already_exists_exception") {
            return Ok(());
        }
        return Err(StorageError::Backend(BackendError::Internal {
            backend_name: "elasticsearch".to_string(),
            message: format!(
                "Failed to create index {} (status {}): {}",
                index, status, body
            ),
            source: None,
        }));
    }

    tracing::info!("Created Elasticsearch index '{}'", index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_index_mapping_structure() {
        let config = ElasticsearchConfig::default();
        let mapping = create_index_mapping(&config);

        assert_eq!(mapping["settings"]["number_of_shards"], 1);
        assert_eq!(mapping["settings"]["refresh_interval"], "1s");

        let props = &mapping["mappings"]["properties"];
        assert_eq!(props["consultation_id"]["type"], "long");
        assert_eq!(props["content_text"]["type"], "text");
        assert_eq!(
            mapping["mappings"]["dynamic_templates"][0]["attribute_strings"]["mapping"]["type"],
            "keyword"
        );
    }
}
