//! Gemini `generateContent` backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument};

use promptcraft_core::{Error, PromptBackend, PromptRequest, Result};

use super::error::{to_core_error, GeminiErrorCode};
use super::types::{extract_text, GenerateContentRequest, GeminiErrorResponse};
use crate::config::GeminiConfig;

/// Backend calling `models/{model}:generateContent` with inline image data.
pub struct GeminiBackend {
    client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    /// Create a new Gemini backend with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            url = %config.base_url,
            model = %config.model,
            "Initializing Gemini backend"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Endpoint URL without the key parameter (safe to log).
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn error_from_response(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let (error_status, message) = match serde_json::from_str::<GeminiErrorResponse>(&body) {
            Ok(parsed) => (parsed.error.status, parsed.error.message),
            Err(_) => (String::new(), body),
        };
        let code = GeminiErrorCode::from_response(status, &error_status);
        to_core_error(code, status, &message)
    }
}

#[async_trait]
impl PromptBackend for GeminiBackend {
    #[instrument(skip(self, request), fields(
        subsystem = "inference",
        op = "generate_content",
        model = %self.config.model,
        image_bytes = request.image.byte_len(),
    ))]
    async fn generate_prompt(&self, request: &PromptRequest) -> Result<Option<String>> {
        let start = Instant::now();
        let body = GenerateContentRequest::from(request);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                Error::Request(format!("Gemini request failed: {}", e.without_url()))
            })?;

        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            debug!(error = %err, "Gemini returned an error status");
            return Err(err);
        }

        let payload: Value = response.json().await.map_err(|e| {
            Error::Serialization(format!(
                "Failed to parse Gemini response: {}",
                e.without_url()
            ))
        })?;

        let text = extract_text(&payload);
        debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            response_len = text.as_ref().map_or(0, String::len),
            "Gemini call completed"
        );
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
