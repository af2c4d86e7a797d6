//! Configuration management

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::core::endpoint::Generation;
use crate::core::errors::{Result, TransfluentError};

const SANDBOX_V2_URL: &str = "https://demo.transfluent.com/v2/";
const SANDBOX_V3_URL: &str = "https://demo.transfluent.com/";
const PRODUCTION_V2_URL: &str = "https://transfluent.com/v2/";
const PRODUCTION_V3_URL: &str = "https://transfluent.com/";

/// Deployment the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    /// Demo servers, relaxed TLS verification
    Sandbox,
    /// Live servers, strict TLS verification
    Production,
}

impl Environment {
    pub fn from_sandbox_flag(sandbox: bool) -> Self {
        if sandbox {
            Environment::Sandbox
        } else {
            Environment::Production
        }
    }

    /// Base URLs for this environment
    pub fn endpoints(self) -> Endpoints {
        let (v2, v3) = match self {
            Environment::Sandbox => (SANDBOX_V2_URL, SANDBOX_V3_URL),
            Environment::Production => (PRODUCTION_V2_URL, PRODUCTION_V3_URL),
        };
        Endpoints {
            v2_base: v2.to_string(),
            v3_base: v3.to_string(),
        }
    }
}

/// Base URL pair used to resolve operation paths
///
/// The legacy generation shares the v3 base (the unversioned host root).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub v2_base: String,
    pub v3_base: String,
}

impl Endpoints {
    /// Point both generations at one host, e.g. a local test server
    pub fn single_host(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            v2_base: format!("{base}/v2/"),
            v3_base: format!("{base}/"),
        }
    }

    pub fn base_for(&self, generation: Generation) -> &str {
        match generation {
            Generation::V2 => &self.v2_base,
            Generation::V3 | Generation::Legacy => &self.v3_base,
        }
    }

    fn validate(&self) -> Result<()> {
        for base in [&self.v2_base, &self.v3_base] {
            Url::parse(base).map_err(|e| {
                TransfluentError::configuration(format!("invalid base URL {base}: {e}"))
            })?;
            if !base.ends_with('/') {
                return Err(TransfluentError::configuration(format!(
                    "base URL {base} must end with '/'"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for the Transfluent client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    pub email: Option<String>,
    pub password: Option<String>,
    pub sandbox: bool,
    /// Pre-obtained token; when set no credential exchange is needed
    pub token: Option<String>,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout_ms: Option<u64>,
    /// Explicit base URLs overriding the environment defaults
    pub endpoints: Option<Endpoints>,
}

impl ClientConfig {
    /// Configuration authenticating with account credentials
    pub fn new(email: impl Into<String>, password: impl Into<String>, sandbox: bool) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
            sandbox,
            ..Default::default()
        }
    }

    /// Configuration reusing a token obtained elsewhere, without credentials
    pub fn with_token(token: impl Into<String>, sandbox: bool) -> Self {
        Self {
            token: Some(token.into()),
            sandbox,
            ..Default::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let email = std::env::var("TRANSFLUENT_EMAIL").ok();
        let password = std::env::var("TRANSFLUENT_PASSWORD").ok();
        let token = std::env::var("TRANSFLUENT_TOKEN").ok().filter(|t| !t.is_empty());

        let sandbox = std::env::var("TRANSFLUENT_SANDBOX")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let timeout_ms = match std::env::var("TRANSFLUENT_TIMEOUT_MS") {
            Ok(v) => Some(v.parse::<u64>().map_err(|e| {
                TransfluentError::configuration(format!("TRANSFLUENT_TIMEOUT_MS: {e}"))
            })?),
            Err(_) => None,
        };

        Ok(Self {
            email,
            password,
            sandbox,
            token,
            timeout_ms,
            endpoints: None,
        })
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn environment(&self) -> Environment {
        Environment::from_sandbox_flag(self.sandbox)
    }

    /// Effective base URLs
    pub fn resolved_endpoints(&self) -> Endpoints {
        self.endpoints
            .clone()
            .unwrap_or_else(|| self.environment().endpoints())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let has_credentials = self.email.as_deref().is_some_and(|e| !e.is_empty())
            && self.password.is_some();

        if self.token.is_none() && !has_credentials {
            warn!("No token or credentials configured, only unauthenticated operations will succeed");
        }

        if self.timeout_ms == Some(0) {
            return Err(TransfluentError::configuration(
                "timeout_ms must be greater than 0",
            ));
        }

        if let Some(endpoints) = &self.endpoints {
            endpoints.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = ClientConfig::new("user@example.com", "secret", true);
        assert!(config.validate().is_ok());

        let config = ClientConfig::with_token("abc", false);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_without_credentials_is_allowed() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.environment(), Environment::Production);
    }

    #[test]
    fn test_config_validation_bad_endpoint() {
        let config = ClientConfig::with_token("abc", false).with_endpoints(Endpoints {
            v2_base: "not a url".to_string(),
            v3_base: "https://transfluent.com/".to_string(),
        });
        assert!(matches!(
            config.validate(),
            Err(TransfluentError::Configuration { .. })
        ));
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let config = ClientConfig::with_token("abc", false).with_timeout_ms(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_environment_endpoints() {
        let sandbox = ClientConfig::new("a", "b", true).resolved_endpoints();
        assert_eq!(sandbox.v2_base, "https://demo.transfluent.com/v2/");
        assert_eq!(sandbox.v3_base, "https://demo.transfluent.com/");

        let production = ClientConfig::new("a", "b", false).resolved_endpoints();
        assert_eq!(production.v2_base, "https://transfluent.com/v2/");
        assert_eq!(production.v3_base, "https://transfluent.com/");
        assert_eq!(production.base_for(Generation::Legacy), "https://transfluent.com/");
    }

    #[test]
    fn test_single_host_endpoints() {
        let endpoints = Endpoints::single_host("http://127.0.0.1:8080/");
        assert_eq!(endpoints.v2_base, "http://127.0.0.1:8080/v2/");
        assert_eq!(endpoints.v3_base, "http://127.0.0.1:8080/");
        assert!(endpoints.validate().is_ok());
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transfluent.json");
        let config = ClientConfig::with_token("abc", true).with_timeout_ms(5000);
        config.to_file(&path).unwrap();

        let loaded = ClientConfig::from_file(&path).unwrap();
        assert_eq!(loaded.token.as_deref(), Some("abc"));
        assert!(loaded.sandbox);
        assert_eq!(loaded.timeout_ms, Some(5000));
    }
}
