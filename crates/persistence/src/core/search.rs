//! Full-text search index trait and query parsing.

use async_trait::async_trait;

use crate::error::{SearchError, StorageResult};
use crate::types::{ConsultationDto, Page, PageRequest};

/// A full-text index mirroring the relational store.
#[async_trait]
pub trait ConsultationSearchIndex: Send + Sync {
    /// Returns a human-readable name for this index backend.
    fn backend_name(&self) -> &'static str;

    /// Adds or replaces the indexed copy of a saved record.
    ///
    /// # Errors
    ///
    /// * `StorageError::Validation(InvalidRecord)` - If the record has no id
    async fn index(&self, dto: &ConsultationDto) -> StorageResult<()>;

    /// Removes a record from the index. Removing an absent id is not an error.
    async fn remove(&self, id: i64) -> StorageResult<()>;

    /// Runs a query and returns one page of matching records.
    ///
    /// Unsorted requests are ordered by relevance, best first, then by id.
    async fn search(
        &self,
        query: &str,
        request: &PageRequest,
    ) -> StorageResult<Page<ConsultationDto>>;
}

/// A single parsed query term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    /// The term text, without any trailing `*`.
    pub text: String,
    /// True if the term ended with `*`.
    pub prefix: bool,
}

/// A parsed search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchQuery {
    /// `*`: every indexed document.
    MatchAll,
    /// Any of the terms (OR semantics).
    Terms(Vec<SearchTerm>),
}

impl SearchQuery {
    /// Parses a query string.
    ///
    /// Terms are separated by whitespace and lowercased. Characters other than
    /// letters, digits, `-` and `_` are dropped from terms, and terms left
    /// without a letter or digit are skipped. A term ending in `*` matches by
    /// prefix.
    ///
    /// ```
    /// use ayoos_persistence::core::{SearchQuery, SearchTerm};
    ///
    /// let query = SearchQuery::parse("Cardio* review").unwrap();
    /// assert_eq!(
    ///     query,
    ///     SearchQuery::Terms(vec![
    ///         SearchTerm { text: "cardio".into(), prefix: true },
    ///         SearchTerm { text: "review".into(), prefix: false },
    ///     ])
    /// );
    /// assert_eq!(SearchQuery::parse("*").unwrap(), SearchQuery::MatchAll);
    /// assert!(SearchQuery::parse("   ").is_err());
    /// ```
    pub fn parse(query: &str) -> Result<Self, SearchError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(SearchError::QueryParseError {
                message: "query must not be blank".to_string(),
            });
        }
        if trimmed == "*" {
            return Ok(SearchQuery::MatchAll);
        }

        let mut terms = Vec::new();
        for raw in trimmed.split_whitespace() {
            let (body, prefix) = match raw.strip_suffix('*') {
                Some(body) => (body, true),
                None => (raw, false),
            };
            let text: String = body
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
                .flat_map(char::to_lowercase)
                .collect();
            if prefix && body.is_empty() {
                return Ok(SearchQuery::MatchAll);
            }
            if !text.chars().any(char::is_alphanumeric) {
                continue;
            }
            if !terms.contains(&SearchTerm {
                text: text.clone(),
                prefix,
            }) {
                terms.push(SearchTerm { text, prefix });
            }
        }

        if terms.is_empty() {
            return Err(SearchError::QueryParseError {
                message: format!("query '{trimmed}' contains no searchable terms"),
            });
        }
        Ok(SearchQuery::Terms(terms))
    }

    /// Returns the terms, empty for [`SearchQuery::MatchAll`].
    pub fn terms(&self) -> &[SearchTerm] {
        match self {
            SearchQuery::MatchAll => &[],
            SearchQuery::Terms(terms) => terms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lowercases_and_dedupes() {
        let query = SearchQuery::parse("Heart HEART heart*").unwrap();
        assert_eq!(
            query.terms(),
            &[
                SearchTerm {
                    text: "heart".to_string(),
                    prefix: false
                },
                SearchTerm {
                    text: "heart".to_string(),
                    prefix: true
                },
            ]
        );
    }

    #[test]
    fn test_parse_strips_operators() {
        let query = SearchQuery::parse("name:(x) \"follow-up\"").unwrap();
        let texts: Vec<&str> = query.terms().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["namex", "follow-up"]);
    }

    #[test]
    fn test_parse_star_term_matches_all() {
        assert_eq!(SearchQuery::parse("foo *").unwrap(), SearchQuery::MatchAll);
    }

    #[test]
    fn test_parse_rejects_punctuation_only() {
        let err = SearchQuery::parse("?? !!").unwrap_err();
        assert!(matches!(err, SearchError::QueryParseError { .. }));
    }

    #[test]
    fn test_parse_skips_terms_without_letters_or_digits() {
        let query = SearchQuery::parse("- __ heart").unwrap();
        assert_eq!(query.terms().len(), 1);
        assert_eq!(query.terms()[0].text, "heart");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(SearchQuery::parse("").is_err());
    }
}
