//! Configuration for the generative API and the identity provider.
//!
//! Both are read once from the environment at start-up and passed explicitly
//! into the components that need them.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GEMINI_API_KEY` | (required) | Generative Language API key |
//! | `GEMINI_BASE_URL` | `https://generativelanguage.googleapis.com/v1beta` | API endpoint |
//! | `GEMINI_MODEL` | `gemini-2.5-flash-preview-05-20` | Model id |
//! | `GEMINI_TIMEOUT` | 120 | Per-attempt timeout (seconds) |
//! | `GEMINI_MAX_RETRIES` | 5 | Retries after HTTP 429 |
//! | `GEMINI_INITIAL_DELAY_MS` | 1000 | First backoff delay |
//! | `PROMPTCRAFT_AUTH_CONFIG` | (required) | JSON provider blob (`apiKey`, `projectId`, `authDomain`) |
//! | `PROMPTCRAFT_AUTH_URL` | `https://identitytoolkit.googleapis.com/v1` | Identity Toolkit endpoint |

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use promptcraft_core::defaults;
use promptcraft_core::{Error, Result, RetryPolicy};

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn validate_url(label: &str, url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(Error::Config(format!("{} cannot be empty", label)));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::Config(format!(
            "{} must start with http:// or https://, got: {}",
            label, url
        )));
    }
    Ok(())
}

// =============================================================================
// GEMINI
// =============================================================================

/// Configuration for the Gemini `generateContent` backend.
#[derive(Clone)]
pub struct GeminiConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key appended as the `key` query parameter.
    pub api_key: String,
    /// Model id used in the request path.
    pub model: String,
    /// Per-attempt request timeout in seconds.
    pub timeout_seconds: u64,
    /// Retries allowed after a rate-limited attempt.
    pub max_retries: u32,
    /// First backoff delay in milliseconds.
    pub initial_delay_ms: u64,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_retries", &self.max_retries)
            .field("initial_delay_ms", &self.initial_delay_ms)
            .finish()
    }
}

impl GeminiConfig {
    /// Config with defaults for everything but the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: defaults::GEMINI_URL.to_string(),
            api_key: api_key.into(),
            model: defaults::GEMINI_MODEL.to_string(),
            timeout_seconds: defaults::GEMINI_TIMEOUT_SECS,
            max_retries: defaults::MAX_RETRIES,
            initial_delay_ms: defaults::INITIAL_RETRY_DELAY_MS,
        }
    }

    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(defaults::ENV_GEMINI_API_KEY).map_err(|_| {
            Error::Config(format!("{} is not set", defaults::ENV_GEMINI_API_KEY))
        })?;

        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var(defaults::ENV_GEMINI_BASE_URL) {
            config.base_url = url;
        }
        if let Ok(model) = std::env::var(defaults::ENV_GEMINI_MODEL) {
            config.model = model;
        }
        if let Some(timeout) = env_parse(defaults::ENV_GEMINI_TIMEOUT) {
            config.timeout_seconds = timeout;
        }
        if let Some(retries) = env_parse(defaults::ENV_GEMINI_MAX_RETRIES) {
            config.max_retries = retries;
        }
        if let Some(delay) = env_parse(defaults::ENV_GEMINI_INITIAL_DELAY_MS) {
            config.initial_delay_ms = delay;
        }

        config.validate()?;
        debug!(?config, "Loaded Gemini configuration");
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_url("Gemini base_url", &self.base_url)?;
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("Gemini API key cannot be empty".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(Error::Config("Gemini model cannot be empty".to_string()));
        }
        if self.timeout_seconds == 0 {
            return Err(Error::Config(
                "Gemini timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.initial_delay_ms),
        )
    }
}

// =============================================================================
// IDENTITY PROVIDER
// =============================================================================

/// Provider configuration blob, as injected by the hosting environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderBlob {
    api_key: String,
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    auth_domain: Option<String>,
}

/// Configuration for anonymous sign-in.
#[derive(Clone)]
pub struct AuthConfig {
    /// Identity Toolkit base URL.
    pub base_url: String,
    /// Web API key of the identity project.
    pub api_key: String,
    pub project_id: Option<String>,
    pub auth_domain: Option<String>,
    /// Sign-in request timeout in seconds.
    pub timeout_seconds: u64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .field("project_id", &self.project_id)
            .field("auth_domain", &self.auth_domain)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl AuthConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: defaults::IDENTITY_TOOLKIT_URL.to_string(),
            api_key: api_key.into(),
            project_id: None,
            auth_domain: None,
            timeout_seconds: defaults::AUTH_TIMEOUT_SECS,
        }
    }

    /// Parse the JSON provider blob (`{"apiKey": ..., "projectId": ..., "authDomain": ...}`).
    pub fn from_json_blob(blob: &str) -> Result<Self> {
        let parsed: ProviderBlob = serde_json::from_str(blob)
            .map_err(|e| Error::Config(format!("Invalid auth provider config: {}", e)))?;

        let mut config = Self::new(parsed.api_key);
        config.project_id = parsed.project_id;
        config.auth_domain = parsed.auth_domain;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        let blob = std::env::var(defaults::ENV_AUTH_CONFIG)
            .map_err(|_| Error::Config(format!("{} is not set", defaults::ENV_AUTH_CONFIG)))?;

        let mut config = Self::from_json_blob(&blob)?;
        if let Ok(url) = std::env::var(defaults::ENV_AUTH_URL) {
            config.base_url = url;
            config.validate()?;
        }
        debug!(?config, "Loaded auth provider configuration");
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_url("Auth base_url", &self.base_url)?;
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("Auth apiKey cannot be empty".to_string()));
        }
        Ok(())
    }
}
