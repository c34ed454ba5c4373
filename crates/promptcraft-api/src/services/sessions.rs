//! In-memory prompt sessions.
//!
//! Each browser tab holds a session id. Every image selection issues a new
//! [`AttemptToken`] for that session; generator transitions are applied only
//! while their token is still the latest one, so a slow request cannot
//! overwrite the result of a newer selection.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};
use uuid::Uuid;

use promptcraft_core::{Applied, AttemptToken, FlowObserver, FlowState, FlowTracker};

/// Default upper bound on tracked sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Session id → flow tracker.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<String, FlowTracker>>>,
    max_sessions: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry evicting the least recently updated session beyond `max_sessions`.
    pub fn with_capacity(max_sessions: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Start a new attempt for `session_id`.
    ///
    /// Unknown or missing ids get a fresh session. Returns the id in use and
    /// the token of the new attempt.
    pub fn select_image(&self, session_id: Option<&str>) -> (String, AttemptToken) {
        let mut sessions = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let id = match session_id {
            Some(id) if sessions.contains_key(id) => id.to_string(),
            _ => {
                let id = Uuid::now_v7().to_string();
                if sessions.len() >= self.max_sessions {
                    evict_oldest(&mut sessions);
                }
                sessions.insert(id.clone(), FlowTracker::new());
                info!(session_id = %id, "Created prompt session");
                id
            }
        };

        let token = sessions
            .entry(id.clone())
            .or_default()
            .select_image();
        debug!(session_id = %id, attempt_token = token.sequence(), "Image selected");
        (id, token)
    }

    /// Snapshot of a session.
    pub fn get(&self, session_id: &str) -> Option<FlowTracker> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
    }

    /// Whether `token` is still the latest attempt of `session_id`.
    pub fn is_current(&self, session_id: &str, token: AttemptToken) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .is_some_and(|tracker| tracker.is_current(token))
    }

    /// Apply a transition on behalf of `token`.
    pub fn apply(&self, session_id: &str, token: AttemptToken, state: FlowState) -> Applied {
        let mut sessions = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        match sessions.get_mut(session_id) {
            Some(tracker) => tracker.apply(token, state),
            // Evicted while the attempt was running.
            None => Applied::Stale,
        }
    }

    /// Observer feeding generator transitions into this registry.
    pub fn observer(&self, session_id: &str, token: AttemptToken) -> SessionObserver {
        SessionObserver {
            registry: self.clone(),
            session_id: session_id.to_string(),
            token,
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn evict_oldest(sessions: &mut HashMap<String, FlowTracker>) {
    let oldest = sessions
        .iter()
        .min_by_key(|(_, tracker)| tracker.updated_at())
        .map(|(id, _)| id.clone());
    if let Some(id) = oldest {
        sessions.remove(&id);
        debug!(session_id = %id, "Evicted least recently used session");
    }
}

/// Applies transitions for one attempt of one session.
pub struct SessionObserver {
    registry: SessionRegistry,
    session_id: String,
    token: AttemptToken,
}

impl SessionObserver {
    pub fn token(&self) -> AttemptToken {
        self.token
    }
}

impl FlowObserver for SessionObserver {
    fn transition(&self, state: FlowState) {
        let label = state.label();
        match self.registry.apply(&self.session_id, self.token, state) {
            Applied::Yes => debug!(
                session_id = %self.session_id,
                attempt_token = self.token.sequence(),
                state = label,
                "Flow transition"
            ),
            Applied::Stale => debug!(
                session_id = %self.session_id,
                attempt_token = self.token.sequence(),
                state = label,
                "Ignored transition from superseded attempt"
            ),
            Applied::Rejected => warn!(
                session_id = %self.session_id,
                attempt_token = self.token.sequence(),
                state = label,
                "Generator produced an invalid flow transition"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_image_creates_session() {
        let registry = SessionRegistry::new();
        let (id, token) = registry.select_image(None);

        assert_eq!(registry.len(), 1);
        assert!(registry.is_current(&id, token));
        assert_eq!(
            registry.get(&id).unwrap().state(),
            &FlowState::ImageSelected
        );
    }

    #[test]
    fn test_unknown_session_id_gets_fresh_session() {
        let registry = SessionRegistry::new();
        let (id, _) = registry.select_image(Some("made-up"));

        assert_ne!(id, "made-up");
        assert!(registry.get("made-up").is_none());
    }

    #[test]
    fn test_reselect_supersedes_previous_attempt() {
        let registry = SessionRegistry::new();
        let (id, first) = registry.select_image(None);
        let (same, second) = registry.select_image(Some(id.as_str()));

        assert_eq!(id, same);
        assert_ne!(first, second);
        assert!(!registry.is_current(&id, first));

        let stale = registry.observer(&id, first);
        stale.transition(FlowState::Authenticating);
        assert_eq!(
            registry.get(&id).unwrap().state(),
            &FlowState::ImageSelected
        );
        assert_eq!(
            registry.apply(&id, first, FlowState::Authenticating),
            Applied::Stale
        );
    }

    #[test]
    fn test_observer_drives_session_to_success() {
        let registry = SessionRegistry::new();
        let (id, token) = registry.select_image(None);
        let observer = registry.observer(&id, token);

        observer.transition(FlowState::Authenticating);
        observer.transition(FlowState::Generating { attempt: 1 });
        observer.transition(FlowState::Generating { attempt: 2 });
        observer.transition(FlowState::Success {
            prompt: "Golden hour".to_string(),
        });

        assert_eq!(
            registry.get(&id).unwrap().state(),
            &FlowState::Success {
                prompt: "Golden hour".to_string()
            }
        );
    }

    #[test]
    fn test_capacity_evicts_oldest_session() {
        let registry = SessionRegistry::with_capacity(2);
        let (first, _) = registry.select_image(None);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let (second, _) = registry.select_image(None);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let (third, _) = registry.select_image(None);

        assert_eq!(registry.len(), 2);
        assert!(registry.get(&first).is_none());
        assert!(registry.get(&second).is_some());
        assert!(registry.get(&third).is_some());
    }

    #[test]
    fn test_apply_on_missing_session_is_stale() {
        let registry = SessionRegistry::new();
        let (_, token) = registry.select_image(None);
        assert_eq!(
            registry.apply("gone", token, FlowState::Authenticating),
            Applied::Stale
        );
    }
}
