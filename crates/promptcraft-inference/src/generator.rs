//! End-to-end prompt generation: authenticate, call the model with retry,
//! and reduce the result to the single message the user sees.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, instrument, warn};

use promptcraft_core::defaults;
use promptcraft_core::{
    retry_with_backoff_observed, FlowObserver, FlowState, IdentityProvider, ImagePayload,
    NoopObserver, PromptBackend, PromptOutcome, PromptRequest, Result, RetryPolicy,
};

use crate::auth::IdentityToolkitProvider;
use crate::config::{AuthConfig, GeminiConfig};
use crate::gemini::GeminiBackend;

/// Orchestrates the auth gate, the retried model call and result extraction.
pub struct PromptGenerator {
    identity: Arc<dyn IdentityProvider>,
    backend: Arc<dyn PromptBackend>,
    policy: RetryPolicy,
}

impl PromptGenerator {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        backend: Arc<dyn PromptBackend>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            identity,
            backend,
            policy,
        }
    }

    /// Build the Identity Toolkit + Gemini pipeline from explicit configuration.
    pub fn from_config(gemini: GeminiConfig, auth: AuthConfig) -> Result<Self> {
        let policy = gemini.retry_policy();
        let backend = GeminiBackend::new(gemini)?;
        let identity = IdentityToolkitProvider::new(auth)?;
        Ok(Self::new(Arc::new(identity), Arc::new(backend), policy))
    }

    /// Build from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_config(GeminiConfig::from_env()?, AuthConfig::from_env()?)
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Generate a prompt for `image`.
    pub async fn generate(&self, image: ImagePayload) -> PromptOutcome {
        self.generate_observed(image, &NoopObserver).await
    }

    /// Generate a prompt for `image`, reporting every flow transition to `observer`.
    ///
    /// Never returns an error: every failure is logged and reduced to a
    /// [`PromptOutcome`] carrying the user-facing message.
    #[instrument(skip_all, fields(
        subsystem = "inference",
        op = "generate_prompt",
        model = %self.backend.model_name(),
        image_bytes = image.byte_len(),
    ))]
    pub async fn generate_observed(
        &self,
        image: ImagePayload,
        observer: &dyn FlowObserver,
    ) -> PromptOutcome {
        let start = Instant::now();

        observer.transition(FlowState::Authenticating);
        match self.identity.sign_in_anonymously().await {
            Ok(session) => {
                info!(
                    provider = self.identity.provider_name(),
                    user_id = %session.user_id,
                    "Authenticated anonymously"
                );
            }
            Err(err) => {
                error!(
                    provider = self.identity.provider_name(),
                    error = %err,
                    "Anonymous sign-in failed, aborting generation"
                );
                return finish(observer, PromptOutcome::AuthFailed);
            }
        }

        let request = PromptRequest::new(image);
        let request = &request;
        let backend = self.backend.as_ref();
        let mut calls: u32 = 0;

        observer.transition(FlowState::Generating { attempt: 1 });
        let result = retry_with_backoff_observed(
            &self.policy,
            || {
                calls += 1;
                backend.generate_prompt(request)
            },
            |event| {
                observer.transition(FlowState::Generating {
                    attempt: event.next_attempt,
                })
            },
        )
        .await;

        let outcome = match result {
            Ok(Some(prompt)) => {
                info!(
                    attempts = calls,
                    response_len = prompt.len(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Prompt generated"
                );
                PromptOutcome::Generated {
                    prompt,
                    attempts: calls,
                    fallback: false,
                }
            }
            Ok(None) => {
                warn!(
                    attempts = calls,
                    "Response did not contain generated text, using fallback"
                );
                PromptOutcome::Generated {
                    prompt: defaults::FALLBACK_PROMPT.to_string(),
                    attempts: calls,
                    fallback: true,
                }
            }
            Err(err) => {
                error!(
                    attempts = calls,
                    rate_limited = err.is_rate_limited(),
                    error = %err,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Prompt generation failed"
                );
                PromptOutcome::GenerationFailed { attempts: calls }
            }
        };

        finish(observer, outcome)
    }
}

fn finish(observer: &dyn FlowObserver, outcome: PromptOutcome) -> PromptOutcome {
    observer.transition(outcome.to_flow_state());
    outcome
}
