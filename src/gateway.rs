//! Search orchestration: validate the request, call the backend under the
//! retry policy, project the raw page into caller-facing results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::{BackendQuery, ResultAttributes, ResultEntry, SearchBackend};
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::{Error, Result};

pub const DEFAULT_MAX_RESULTS: u32 = 10;
pub const MAX_RESULTS_LIMIT: u32 = 50;

/// One validated search invocation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
    /// Natural-language query to run against the documentation index.
    #[schemars(length(min = 1))]
    pub query: String,

    /// Maximum number of results to return.
    #[serde(default = "default_max_results")]
    #[schemars(range(min = 1, max = 50))]
    pub max_results: u32,

    /// Let the backend rewrite the query for better recall.
    #[serde(default)]
    pub rewrite_query: bool,

    /// Drop results scoring below this relevance threshold.
    #[serde(default)]
    #[schemars(range(min = 0.0, max = 1.0))]
    pub score_threshold: f64,
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: DEFAULT_MAX_RESULTS,
            rewrite_query: false,
            score_threshold: 0.0,
        }
    }

    pub fn max_results(mut self, limit: u32) -> Self {
        self.max_results = limit;
        self
    }

    pub fn rewrite_query(mut self, enabled: bool) -> Self {
        self.rewrite_query = enabled;
        self
    }

    pub fn score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Check the preconditions the input schema promises to callers.
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(Error::invalid_request("query must not be empty"));
        }
        if !(1..=MAX_RESULTS_LIMIT).contains(&self.max_results) {
            return Err(Error::invalid_request(format!(
                "max_results must be between 1 and {}, got {}",
                MAX_RESULTS_LIMIT, self.max_results
            )));
        }
        if !(0.0..=1.0).contains(&self.score_threshold) {
            return Err(Error::invalid_request(format!(
                "score_threshold must be between 0.0 and 1.0, got {}",
                self.score_threshold
            )));
        }
        Ok(())
    }
}

/// Projection of one result entry: fragment texts joined, attributes kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub file_id: String,
    pub filename: String,
    pub score: f64,
    /// All content fragment texts, joined with newlines in backend order.
    pub text: String,
    pub attributes: ResultAttributes,
}

impl From<ResultEntry> for SearchResult {
    fn from(entry: ResultEntry) -> Self {
        let text = entry
            .content
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            file_id: entry.file_id,
            filename: entry.filename,
            score: entry.score,
            text,
            attributes: entry.attributes,
        }
    }
}

/// The gateway between the tool surface and the search backend.
#[derive(Debug)]
pub struct SearchGateway {
    backend: SearchBackend,
    retry: RetryPolicy,
}

impl SearchGateway {
    pub fn new(backend: SearchBackend) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Run one search end to end.
    ///
    /// The backend call is retried for transient failures only; the last
    /// failure is surfaced unchanged once the budget is spent. Results keep
    /// the backend's ranking order, and an empty page is a valid outcome,
    /// not an error.
    pub async fn query(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        request.validate()?;

        let backend_query = BackendQuery::new(request.query.as_str())
            .max_num_results(request.max_results)
            .rewrite_query(request.rewrite_query)
            .score_threshold(request.score_threshold);

        let page = retry_with_backoff(
            &self.retry,
            || self.backend.search(&backend_query),
            Error::is_retryable,
        )
        .await?;

        debug!(results = page.data.len(), "projecting search results");
        Ok(page.data.into_iter().map(SearchResult::from).collect())
    }
}
