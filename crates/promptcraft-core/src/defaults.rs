//! Centralized default constants for promptcraft.
//!
//! Every crate references these constants instead of defining its own magic
//! numbers or user-facing strings.

// =============================================================================
// RETRY
// =============================================================================

/// Maximum number of retries after a rate-limited attempt.
pub const MAX_RETRIES: u32 = 5;

/// Delay before the first retry, in milliseconds. Doubles on every retry.
pub const INITIAL_RETRY_DELAY_MS: u64 = 1000;

// =============================================================================
// GENERATIVE API
// =============================================================================

/// Base URL of the Generative Language API.
pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for prompt generation.
pub const GEMINI_MODEL: &str = "gemini-2.5-flash-preview-05-20";

/// Per-attempt request timeout, in seconds.
pub const GEMINI_TIMEOUT_SECS: u64 = 120;

/// Environment variable names for the generative API.
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_GEMINI_TIMEOUT: &str = "GEMINI_TIMEOUT";
pub const ENV_GEMINI_MAX_RETRIES: &str = "GEMINI_MAX_RETRIES";
pub const ENV_GEMINI_INITIAL_DELAY_MS: &str = "GEMINI_INITIAL_DELAY_MS";

// =============================================================================
// IDENTITY PROVIDER
// =============================================================================

/// Base URL of the Identity Toolkit API used for anonymous sign-in.
pub const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Environment variable holding the JSON provider configuration blob.
pub const ENV_AUTH_CONFIG: &str = "PROMPTCRAFT_AUTH_CONFIG";

/// Environment variable overriding the identity provider base URL.
pub const ENV_AUTH_URL: &str = "PROMPTCRAFT_AUTH_URL";

/// Timeout for the sign-in call, in seconds.
pub const AUTH_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// IMAGE INTAKE
// =============================================================================

/// MIME type assumed when neither detection nor the caller supplies one.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Largest accepted image, in bytes (20 MiB, the inline-data ceiling).
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

// =============================================================================
// PROMPT TEMPLATE
// =============================================================================

/// Instruction sent alongside every image.
pub const PROMPT_INSTRUCTION: &str = "Analyze this image and write a single, highly detailed \
prompt that an image-generation model could use to recreate it as a photorealistic photograph. \
Describe the main subject, setting and background. Specify the camera and lens (for example \
\"shot on a Sony A7 IV with an 85mm f/1.4 lens\"), aperture, shutter speed and ISO, the \
lighting setup (direction, quality, color temperature, time of day), the color palette and \
grading, the composition and framing (angle, distance, rule of thirds, depth of field), and \
the textures and fine details that make it look real. Respond with the prompt text only, \
without any preamble, headings or explanation.";

// =============================================================================
// USER-FACING MESSAGES
// =============================================================================

/// Shown when anonymous sign-in fails.
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed. Please try again.";

/// Shown when generation fails or retries are exhausted.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate prompt. Please try again later.";

/// Substituted when the response lacks the generated text field.
pub const FALLBACK_PROMPT: &str = "Could not generate prompt, please try again.";

/// Shown after a successful clipboard copy.
pub const COPY_CONFIRMATION: &str = "Prompt copied to clipboard!";

/// Shown when every clipboard mechanism failed.
pub const COPY_FAILED_MESSAGE: &str = "Failed to copy prompt to clipboard.";

// =============================================================================
// SERVER
// =============================================================================

/// Default bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const SERVER_PORT: u16 = 3000;
