//! Elasticsearch search index implementation.
//!
//! Elasticsearch can replace the SQLite FTS index as the consultation search
//! index. The relational store stays in SQLite.
//!
//! # Index Structure
//!
//! All consultations live in one index, `{prefix}_consultation`, keyed by the
//! record id. Queries use `query_string` against the extracted text and
//! `from`/`size` for paging.

mod backend;
mod schema;
mod search_index;

pub use backend::{ElasticsearchAuth, ElasticsearchConfig, ElasticsearchIndex};
pub use schema::create_index_mapping;
