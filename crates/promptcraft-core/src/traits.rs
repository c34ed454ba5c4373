//! Traits at the seams between the generator and its external collaborators.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AuthSession, PromptRequest};

/// Identity provider issuing anonymous sessions.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in anonymously. Called once per generation; never retried.
    async fn sign_in_anonymously(&self) -> Result<AuthSession>;

    /// Provider name for logs.
    fn provider_name(&self) -> &str;
}

/// Remote model turning an image plus instruction into text.
#[async_trait]
pub trait PromptBackend: Send + Sync {
    /// Perform a single generation call.
    ///
    /// Returns `Ok(None)` when the call succeeded but the response did not
    /// contain generated text. Rate-limited calls must fail with an error whose
    /// `is_rate_limited()` is true.
    async fn generate_prompt(&self, request: &PromptRequest) -> Result<Option<String>>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
