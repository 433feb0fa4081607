//! Client for the hosted vector-search backend.
//!
//! One endpoint matters here: `POST {base}/vector_stores/{index}/search`.
//! The client owns authentication, the outbound timeout and lenient
//! parsing of error bodies; retry sits a layer above, in
//! [`crate::gateway`].

mod types;

pub use types::{
    BackendQuery, ContentChunk, RankingOptions, RawSearchResponse, ResultAttributes, ResultEntry,
};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::config::BackendConfig;
use crate::{Error, Result};

/// HTTP client bound to one search index.
pub struct SearchBackend {
    http: reqwest::Client,
    base_url: String,
    index_id: String,
    api_key: SecretString,
}

impl SearchBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            index_id: config.index_id.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Identifier of the index this client queries.
    pub fn index_id(&self) -> &str {
        &self.index_id
    }

    fn search_url(&self) -> String {
        format!("{}/vector_stores/{}/search", self.base_url, self.index_id)
    }

    /// Run one search call. A non-2xx status maps to [`Error::Backend`],
    /// transport failures to [`Error::Network`], and a body that does not
    /// match the documented page shape to [`Error::Schema`].
    pub async fn search(&self, query: &BackendQuery) -> Result<RawSearchResponse> {
        debug!(
            index_id = %self.index_id,
            max_num_results = query.max_num_results,
            "dispatching search request"
        );

        let response = self
            .http
            .post(self.search_url())
            .bearer_auth(self.api_key.expose_secret())
            .json(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let body = response.text().await?;
        let page = RawSearchResponse::from_json(&body)?;
        debug!(
            results = page.data.len(),
            has_more = page.has_more,
            "search page received"
        );
        Ok(page)
    }
}

impl std::fmt::Debug for SearchBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchBackend")
            .field("base_url", &self.base_url)
            .field("index_id", &self.index_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Best-effort extraction of a human-readable message from an error body.
///
/// Error bodies are not guaranteed to be the JSON envelope, so anything
/// unparseable falls back to the raw text, then to the status reason.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.message;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}
