//! Prompt flow state machine and attempt tokens.
//!
//! A flow moves `Idle → ImageSelected → Authenticating → Generating → Success | Failed`.
//! Selecting a new image restarts the cycle from `ImageSelected` and issues a
//! fresh [`AttemptToken`]; transitions carrying an older token are discarded so
//! a slow request can never overwrite the result of a newer one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// State of one prompt flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FlowState {
    Idle,
    ImageSelected,
    Authenticating,
    /// `attempt` is 1 for the first call and grows with each rate-limit retry.
    Generating {
        attempt: u32,
    },
    Success {
        prompt: String,
    },
    Failed {
        message: String,
    },
}

impl FlowState {
    /// Whether the machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: &FlowState) -> bool {
        use FlowState::*;
        match (self, next) {
            // A new image may be chosen at any point.
            (_, ImageSelected) => true,
            (ImageSelected, Authenticating) => true,
            (Authenticating, Generating { attempt: 1 }) => true,
            (Authenticating, Failed { .. }) => true,
            (Generating { attempt: prev }, Generating { attempt: cur }) => *cur == prev + 1,
            (Generating { .. }, Success { .. } | Failed { .. }) => true,
            _ => false,
        }
    }

    /// Terminal states end an attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Success { .. } | FlowState::Failed { .. })
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            FlowState::Idle => "idle",
            FlowState::ImageSelected => "image_selected",
            FlowState::Authenticating => "authenticating",
            FlowState::Generating { .. } => "generating",
            FlowState::Success { .. } => "success",
            FlowState::Failed { .. } => "failed",
        }
    }
}

/// Identifies one attempt within a flow. Only the latest token may mutate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptToken(u64);

impl AttemptToken {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Receives flow transitions as the generator advances.
pub trait FlowObserver: Send + Sync {
    fn transition(&self, state: FlowState);
}

/// Observer that ignores every transition.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl FlowObserver for NoopObserver {
    fn transition(&self, _state: FlowState) {}
}

/// Outcome of applying a transition to a [`FlowTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Yes,
    /// Token belongs to a superseded attempt.
    Stale,
    /// Edge not allowed by the state machine.
    Rejected,
}

/// Current state of one flow plus the token of its latest attempt.
#[derive(Debug, Clone, Serialize)]
pub struct FlowTracker {
    #[serde(flatten)]
    state: FlowState,
    /// Serialized apart from the `attempt` retry count of `Generating`.
    #[serde(rename = "attempt_token")]
    attempt: Option<AttemptToken>,
    updated_at: DateTime<Utc>,
}

impl Default for FlowTracker {
    fn default() -> Self {
        Self {
            state: FlowState::Idle,
            attempt: None,
            updated_at: Utc::now(),
        }
    }
}

impl FlowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn current_attempt(&self) -> Option<AttemptToken> {
        self.attempt
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Start a new attempt for a freshly selected image, superseding any
    /// attempt still in flight and discarding the prior result.
    pub fn select_image(&mut self) -> AttemptToken {
        let next = AttemptToken(self.attempt.map_or(1, |t| t.0 + 1));
        self.attempt = Some(next);
        self.state = FlowState::ImageSelected;
        self.updated_at = Utc::now();
        next
    }

    pub fn is_current(&self, token: AttemptToken) -> bool {
        self.attempt == Some(token)
    }

    /// Apply `next` on behalf of `token`.
    pub fn apply(&mut self, token: AttemptToken, next: FlowState) -> Applied {
        if !self.is_current(token) {
            debug!(
                attempt_token = token.0,
                state = next.label(),
                "Discarding transition from superseded attempt"
            );
            return Applied::Stale;
        }
        if !self.state.can_transition_to(&next) {
            debug!(
                from = self.state.label(),
                to = next.label(),
                "Rejected invalid flow transition"
            );
            return Applied::Rejected;
        }
        self.state = next;
        self.updated_at = Utc::now();
        Applied::Yes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_success(tracker: &mut FlowTracker, token: AttemptToken) {
        assert_eq!(tracker.apply(token, FlowState::Authenticating), Applied::Yes);
        assert_eq!(
            tracker.apply(token, FlowState::Generating { attempt: 1 }),
            Applied::Yes
        );
        assert_eq!(
            tracker.apply(
                token,
                FlowState::Success {
                    prompt: "A studio-lit portrait".to_string()
                }
            ),
            Applied::Yes
        );
    }

    #[test]
    fn test_new_tracker_is_idle() {
        let tracker = FlowTracker::new();
        assert_eq!(tracker.state(), &FlowState::Idle);
        assert!(tracker.current_attempt().is_none());
    }

    #[test]
    fn test_happy_path() {
        let mut tracker = FlowTracker::new();
        let token = tracker.select_image();
        run_to_success(&mut tracker, token);
        assert!(tracker.state().is_terminal());
    }

    #[test]
    fn test_retry_sub_states_must_be_sequential() {
        let mut tracker = FlowTracker::new();
        let token = tracker.select_image();
        tracker.apply(token, FlowState::Authenticating);
        tracker.apply(token, FlowState::Generating { attempt: 1 });

        assert_eq!(
            tracker.apply(token, FlowState::Generating { attempt: 3 }),
            Applied::Rejected
        );
        assert_eq!(
            tracker.apply(token, FlowState::Generating { attempt: 2 }),
            Applied::Yes
        );
    }

    #[test]
    fn test_auth_failure_is_terminal_edge() {
        let mut tracker = FlowTracker::new();
        let token = tracker.select_image();
        tracker.apply(token, FlowState::Authenticating);
        let failed = FlowState::Failed {
            message: "Authentication failed. Please try again.".to_string(),
        };
        assert_eq!(tracker.apply(token, failed), Applied::Yes);
    }

    #[test]
    fn test_cannot_skip_authentication() {
        let mut tracker = FlowTracker::new();
        let token = tracker.select_image();
        assert_eq!(
            tracker.apply(token, FlowState::Generating { attempt: 1 }),
            Applied::Rejected
        );
        assert_eq!(tracker.state(), &FlowState::ImageSelected);
    }

    #[test]
    fn test_stale_attempt_cannot_overwrite_newer_one() {
        let mut tracker = FlowTracker::new();
        let first = tracker.select_image();
        tracker.apply(first, FlowState::Authenticating);

        let second = tracker.select_image();
        assert_ne!(first, second);
        assert_eq!(tracker.state(), &FlowState::ImageSelected);

        let late = FlowState::Success {
            prompt: "old image".to_string(),
        };
        assert_eq!(tracker.apply(first, late), Applied::Stale);
        assert_eq!(tracker.state(), &FlowState::ImageSelected);

        run_to_success(&mut tracker, second);
    }

    #[test]
    fn test_new_image_discards_prior_result() {
        let mut tracker = FlowTracker::new();
        let token = tracker.select_image();
        run_to_success(&mut tracker, token);

        tracker.select_image();
        assert_eq!(tracker.state(), &FlowState::ImageSelected);
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_value(FlowState::Generating { attempt: 2 }).unwrap();
        assert_eq!(json["state"], "generating");
        assert_eq!(json["attempt"], 2);

        let json = serde_json::to_value(FlowState::ImageSelected).unwrap();
        assert_eq!(json["state"], "image_selected");
    }

    #[test]
    fn test_tracker_serialization_flattens_state() {
        let mut tracker = FlowTracker::new();
        let token = tracker.select_image();
        tracker.apply(token, FlowState::Authenticating);

        let json = serde_json::to_value(&tracker).unwrap();
        assert_eq!(json["state"], "authenticating");
        assert_eq!(json["attempt_token"], 1);
        assert!(json["updated_at"].is_string());
    }

    #[test]
    fn test_tracker_serialization_keeps_retry_count_and_token_apart() {
        let mut tracker = FlowTracker::new();
        tracker.select_image();
        tracker.select_image();
        let token = tracker.select_image();
        tracker.apply(token, FlowState::Authenticating);
        tracker.apply(token, FlowState::Generating { attempt: 1 });
        tracker.apply(token, FlowState::Generating { attempt: 2 });

        let text = serde_json::to_string(&tracker).unwrap();
        assert_eq!(text.matches("\"attempt\"").count(), 1);

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["state"], "generating");
        assert_eq!(json["attempt"], 2);
        assert_eq!(json["attempt_token"], 3);
    }
}
