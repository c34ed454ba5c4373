//! Structured logging field name constants for promptcraft.
//!
//! All crates use these constants for consistent structured logging fields.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Generation failed, user sees the generic failure message |
//! | WARN  | Recoverable issue: rate-limit retry, fallback text, clipboard fallback |
//! | INFO  | Lifecycle events (startup, sign-in, completed generation) |
//! | DEBUG | Decision points, request sizes, config choices |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID of the HTTP request (UUIDv7).
pub const REQUEST_ID: &str = "request_id";

/// Browser session the flow state belongs to.
pub const SESSION_ID: &str = "session_id";

/// Attempt token sequence number within a session.
pub const ATTEMPT_TOKEN: &str = "attempt_token";

/// Subsystem originating the log event ("api", "inference", "auth", "clipboard").
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name ("generate_content", "sign_in", "copy").
pub const OPERATION: &str = "op";

// ─── Retry fields ──────────────────────────────────────────────────────────

/// 1-based attempt number of the current call.
pub const ATTEMPT: &str = "attempt";

/// Retries still available.
pub const RETRIES_LEFT: &str = "retries_left";

/// Delay before the next attempt, in milliseconds.
pub const DELAY_MS: &str = "delay_ms";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Byte length of the decoded image.
pub const IMAGE_BYTES: &str = "image_bytes";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// HTTP status returned upstream.
pub const STATUS: &str = "status";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
