//! Wire types for the hosted vector-search API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Outbound search request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendQuery {
    pub query: String,
    pub max_num_results: u32,
    pub rewrite_query: bool,
    pub ranking_options: RankingOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingOptions {
    pub score_threshold: f64,
}

impl BackendQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_num_results: 10,
            rewrite_query: false,
            ranking_options: RankingOptions::default(),
        }
    }

    pub fn max_num_results(mut self, limit: u32) -> Self {
        self.max_num_results = limit;
        self
    }

    pub fn rewrite_query(mut self, enabled: bool) -> Self {
        self.rewrite_query = enabled;
        self
    }

    pub fn score_threshold(mut self, threshold: f64) -> Self {
        self.ranking_options.score_threshold = threshold;
        self
    }
}

/// Search response page as the backend returns it.
///
/// Deserialization doubles as shape validation: a missing or mistyped
/// required field is a contract break and surfaces as [`Error::Schema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSearchResponse {
    /// Object marker, e.g. `vector_store.search_results.page`.
    pub object: String,
    /// The query as the backend ran it (possibly rewritten).
    pub search_query: String,
    pub data: Vec<ResultEntry>,
    pub has_more: bool,
    /// Pagination token. Required on the wire, but nullable.
    #[serde(deserialize_with = "nullable_string")]
    pub next_page: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub file_id: String,
    pub filename: String,
    pub score: f64,
    #[serde(default)]
    pub attributes: ResultAttributes,
    pub content: Vec<ContentChunk>,
}

/// Caller-defined metadata attached to an indexed file.
///
/// Two keys are well-known; everything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// One fragment of matched document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentChunk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub chunk_type: String,
    pub text: String,
}

impl RawSearchResponse {
    /// Parse and shape-check a response body.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| Error::Schema(e.to_string()))
    }
}

// Unlike a plain `Option` field, `deserialize_with` keeps the key itself
// mandatory, so an absent `next_page` fails shape validation.
fn nullable_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::deserialize(deserializer)
}
