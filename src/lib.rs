//! # docs-gateway
//!
//! HTTP gateway that fronts a hosted vector-search service and exposes
//! documentation search as a single tool behind a JSON-RPC tool-calling
//! endpoint.
//!
//! The crate is organized in four layers:
//!
//! - [`backend`]: typed client for the hosted search API
//! - [`gateway`]: request validation, retry orchestration, result projection
//! - [`tools`]: the `search_docs` tool and the registry it lives in
//! - [`server`]: the axum HTTP surface (service info + JSON-RPC endpoint)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docs_gateway::{BackendConfig, SearchBackend, SearchGateway, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), docs_gateway::Error> {
//!     let config = BackendConfig::new("api-key", "vs_docs");
//!     let gateway = SearchGateway::new(SearchBackend::new(&config)?);
//!
//!     let results = gateway.query(&SearchRequest::new("how do I install?")).await?;
//!     for result in &results {
//!         println!("{} ({:.3}): {}", result.filename, result.score, result.text);
//!     }
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod backend;
pub mod config;
pub mod gateway;
pub mod retry;
pub mod server;
pub mod tools;

// Re-exports for convenience
pub use backend::{
    BackendQuery, ContentChunk, RawSearchResponse, ResultAttributes, ResultEntry, SearchBackend,
};
pub use config::{BackendConfig, GatewayConfig, ServerConfig};
pub use gateway::{SearchGateway, SearchRequest, SearchResult};
pub use retry::{RetryPolicy, is_transient, retry_with_backoff};
pub use server::{AppState, ServiceDescriptor, create_router};
pub use tools::{SearchDocsTool, Tool, ToolDefinition, ToolRegistry, ToolResult};

/// Crate version, surfaced in the service descriptor and `initialize` result.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors returned by the gateway.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Backend returned an HTTP error status.
    #[error("Backend error (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    /// Network connectivity or request failed.
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend response does not match the documented shape.
    #[error("Schema validation failed: {0}")]
    Schema(String),

    /// Request parameters are invalid.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// File system or socket operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Error::Backend {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest(message.into())
    }

    /// HTTP status associated with the failure, when one exists.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Backend { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Classification runs over the normalized failure descriptor (status
    /// code plus rendered message), so backend statuses, transport errors
    /// and shape mismatches all funnel through [`retry::is_transient`].
    pub fn is_retryable(&self) -> bool {
        retry::is_transient(self.status_code(), Some(&self.to_string()))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
