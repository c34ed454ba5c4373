//! Domain models shared across promptcraft crates.

use std::fmt;

use serde::Serialize;

use crate::defaults;
use crate::flow::FlowState;
use crate::image::ImagePayload;

// =============================================================================
// AUTH
// =============================================================================

/// Anonymous session issued by the identity provider.
#[derive(Clone)]
pub struct AuthSession {
    /// Provider-side user id of the anonymous account.
    pub user_id: String,
    /// Short-lived ID token.
    pub id_token: String,
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds, as reported by the provider.
    pub expires_in_secs: Option<u64>,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("user_id", &self.user_id)
            .field("id_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("expires_in_secs", &self.expires_in_secs)
            .finish()
    }
}

// =============================================================================
// PROMPT REQUEST / OUTCOME
// =============================================================================

/// Instruction plus inline image, built fresh for every generation call.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub instruction: String,
    pub image: ImagePayload,
}

impl PromptRequest {
    /// Request using the fixed photorealistic-prompt instruction.
    pub fn new(image: ImagePayload) -> Self {
        Self {
            instruction: defaults::PROMPT_INSTRUCTION.to_string(),
            image,
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }
}

/// Result of one end-to-end generation, already reduced to what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PromptOutcome {
    /// Text was produced. `fallback` is set when the response lacked the
    /// generated text and the placeholder was substituted.
    Generated {
        prompt: String,
        attempts: u32,
        fallback: bool,
    },
    /// Anonymous sign-in failed; no generation call was made.
    AuthFailed,
    /// Non-retryable error or retries exhausted.
    GenerationFailed { attempts: u32 },
}

impl PromptOutcome {
    /// The single string displayed to the user.
    pub fn display_text(&self) -> &str {
        match self {
            PromptOutcome::Generated { prompt, .. } => prompt,
            PromptOutcome::AuthFailed => defaults::AUTH_FAILED_MESSAGE,
            PromptOutcome::GenerationFailed { .. } => defaults::GENERATION_FAILED_MESSAGE,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PromptOutcome::Generated { .. })
    }

    /// Calls made to the generation endpoint (0 when auth failed).
    pub fn attempts(&self) -> u32 {
        match self {
            PromptOutcome::Generated { attempts, .. } => *attempts,
            PromptOutcome::AuthFailed => 0,
            PromptOutcome::GenerationFailed { attempts } => *attempts,
        }
    }

    /// Terminal flow state matching this outcome.
    pub fn to_flow_state(&self) -> FlowState {
        match self {
            PromptOutcome::Generated { prompt, .. } => FlowState::Success {
                prompt: prompt.clone(),
            },
            other => FlowState::Failed {
                message: other.display_text().to_string(),
            },
        }
    }
}
