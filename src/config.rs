//! Service configuration, sourced from `DOCS_GATEWAY_*` environment
//! variables with sensible defaults for everything but credentials.

use std::env;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{Error, Result};

pub const DEFAULT_BACKEND_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub backend: BackendConfig,
    pub server: ServerConfig,
}

impl GatewayConfig {
    /// Read the full configuration from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            backend: BackendConfig::from_env()?,
            server: ServerConfig::from_env()?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.backend.validate()
    }
}

/// Where and how to reach the hosted search API.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the search API.
    pub base_url: String,
    /// Bearer credential for the search API.
    pub api_key: SecretString,
    /// Identifier of the index (vector store) to query.
    pub index_id: String,
    /// Outbound request timeout.
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(api_key: impl Into<String>, index_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            api_key: SecretString::from(api_key.into()),
            index_id: index_id.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Credentials come from `DOCS_GATEWAY_API_KEY`, falling back to the
    /// provider-conventional `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("DOCS_GATEWAY_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .map_err(|_| Error::Config("DOCS_GATEWAY_API_KEY is not set".to_string()))?;
        let index_id = env::var("DOCS_GATEWAY_INDEX_ID")
            .map_err(|_| Error::Config("DOCS_GATEWAY_INDEX_ID is not set".to_string()))?;

        let mut config = Self::new(api_key, index_id);
        if let Ok(url) = env::var("DOCS_GATEWAY_BACKEND_URL") {
            config.base_url = url;
        }
        if let Ok(raw) = env::var("DOCS_GATEWAY_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| {
                Error::Config(format!(
                    "DOCS_GATEWAY_TIMEOUT_SECS must be an integer, got {raw:?}"
                ))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Set the backend base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the outbound request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid backend URL {:?}: {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "backend URL must be http or https, got {:?}",
                self.base_url
            )));
        }
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(Error::Config("backend API key is empty".to_string()));
        }
        if self.index_id.trim().is_empty() {
            return Err(Error::Config("search index identifier is empty".to_string()));
        }
        Ok(())
    }
}

/// Listener settings for the HTTP surface.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(address) = env::var("DOCS_GATEWAY_BIND_ADDRESS") {
            config.bind_address = address;
        }
        if let Ok(raw) = env::var("DOCS_GATEWAY_PORT") {
            config.port = raw.parse().map_err(|_| {
                Error::Config(format!("DOCS_GATEWAY_PORT must be a port number, got {raw:?}"))
            })?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_defaults() {
        let config = BackendConfig::new("key", "vs_docs");
        assert_eq!(config.base_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.index_id, "vs_docs");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        config.validate().unwrap();
    }

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_backend_url_rejected() {
        let config = BackendConfig::new("key", "vs_docs").base_url("not a url");
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let config = BackendConfig::new("key", "vs_docs").base_url("ftp://example.com");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let config = BackendConfig::new("   ", "vs_docs");
        assert!(config.validate().is_err());

        let config = BackendConfig::new("key", "");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_env_reads_overrides() {
        // SAFETY: test-only environment mutation; vars are removed before
        // the test returns and no other test reads this prefix.
        unsafe {
            env::set_var("DOCS_GATEWAY_API_KEY", "sk-test");
            env::set_var("DOCS_GATEWAY_INDEX_ID", "vs_env");
            env::set_var("DOCS_GATEWAY_BACKEND_URL", "https://search.internal/v2");
            env::set_var("DOCS_GATEWAY_TIMEOUT_SECS", "5");
            env::set_var("DOCS_GATEWAY_BIND_ADDRESS", "127.0.0.1");
            env::set_var("DOCS_GATEWAY_PORT", "9090");
        }

        let config = GatewayConfig::from_env().unwrap();

        // SAFETY: same vars set above
        unsafe {
            env::remove_var("DOCS_GATEWAY_API_KEY");
            env::remove_var("DOCS_GATEWAY_INDEX_ID");
            env::remove_var("DOCS_GATEWAY_BACKEND_URL");
            env::remove_var("DOCS_GATEWAY_TIMEOUT_SECS");
            env::remove_var("DOCS_GATEWAY_BIND_ADDRESS");
            env::remove_var("DOCS_GATEWAY_PORT");
        }

        assert_eq!(config.backend.base_url, "https://search.internal/v2");
        assert_eq!(config.backend.index_id, "vs_env");
        assert_eq!(config.backend.timeout, Duration::from_secs(5));
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        config.validate().unwrap();
    }
}
