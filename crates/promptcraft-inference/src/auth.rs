//! Anonymous sign-in against the Identity Toolkit REST API.
//!
//! `POST {base_url}/accounts:signUp?key={api_key}` with
//! `{"returnSecureToken": true}` and no credentials creates an anonymous
//! account and returns its ID token.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use promptcraft_core::{AuthSession, Error, IdentityProvider, Result};

use crate::config::AuthConfig;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest {
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    id_token: String,
    local_id: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Seconds, encoded as a string by the API.
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Identity provider issuing anonymous sessions through Identity Toolkit.
pub struct IdentityToolkitProvider {
    client: Client,
    config: AuthConfig,
}

impl IdentityToolkitProvider {
    pub fn new(config: AuthConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "auth",
            url = %config.base_url,
            project_id = config.project_id.as_deref().unwrap_or("(unset)"),
            "Initializing anonymous identity provider"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(AuthConfig::from_env()?)
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    fn sign_up_url(&self) -> String {
        format!("{}/accounts:signUp", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitProvider {
    #[instrument(skip(self), fields(subsystem = "auth", op = "sign_in"))]
    async fn sign_in_anonymously(&self) -> Result<AuthSession> {
        let response = self
            .client
            .post(self.sign_up_url())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&SignUpRequest {
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| {
                Error::Authentication(format!("Sign-in request failed: {}", e.without_url()))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(Error::Authentication(format!(
                "Identity provider returned {}: {}",
                status, message
            )));
        }

        let parsed: SignUpResponse = response.json().await.map_err(|e| {
            Error::Authentication(format!(
                "Failed to parse sign-in response: {}",
                e.without_url()
            ))
        })?;

        debug!(user_id = %parsed.local_id, "Anonymous session established");

        Ok(AuthSession {
            user_id: parsed.local_id,
            id_token: parsed.id_token,
            refresh_token: parsed.refresh_token,
            expires_in_secs: parsed.expires_in.and_then(|s| s.parse().ok()),
        })
    }

    fn provider_name(&self) -> &str {
        "identity-toolkit"
    }
}
