//! # promptcraft-core
//!
//! Core types, traits, and abstractions for promptcraft.
//!
//! This crate provides the foundational pieces the inference backends and the
//! HTTP server build on: the error type, defaults, image intake, the prompt
//! flow state machine, the rate-limit retry helper, and clipboard backends.

pub mod clipboard;
pub mod defaults;
pub mod error;
pub mod flow;
pub mod image;
pub mod logging;
pub mod models;
pub mod retry;
pub mod traits;

// Re-export commonly used types at crate root
pub use clipboard::{
    copy_with_fallback, ClipboardBackend, ClipboardError, CommandClipboard, CopyConfirmation,
    Osc52Clipboard,
};
pub use error::{Error, Result};
pub use flow::{Applied, AttemptToken, FlowObserver, FlowState, FlowTracker, NoopObserver};
pub use image::ImagePayload;
pub use models::*;
pub use retry::{
    retry_with_backoff, retry_with_backoff_observed, RateLimitSignal, RetryEvent, RetryPolicy,
};
pub use traits::*;
