//! Service layer for session state.

pub mod sessions;

pub use sessions::{SessionObserver, SessionRegistry, DEFAULT_MAX_SESSIONS};
