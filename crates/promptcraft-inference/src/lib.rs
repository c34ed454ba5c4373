//! # promptcraft-inference
//!
//! Remote services behind prompt generation.
//!
//! This crate provides:
//! - Anonymous sign-in through the Identity Toolkit REST API
//! - Gemini `generateContent` backend with inline image data
//! - [`PromptGenerator`], which gates generation on sign-in and retries
//!   rate-limited calls with exponential backoff
//!
//! # Example
//!
//! ```rust,no_run
//! use promptcraft_inference::{ImagePayload, PromptGenerator};
//!
//! #[tokio::main]
//! async fn main() {
//!     let generator = PromptGenerator::from_env().unwrap();
//!     let bytes = std::fs::read("photo.jpg").unwrap();
//!     let outcome = generator
//!         .generate(ImagePayload::from_bytes(&bytes, None).unwrap())
//!         .await;
//!     println!("{}", outcome.display_text());
//! }
//! ```

pub mod auth;
pub mod config;
pub mod gemini;
pub mod generator;

// Re-export core types
pub use promptcraft_core::*;

pub use auth::IdentityToolkitProvider;
pub use config::{AuthConfig, GeminiConfig};
pub use gemini::GeminiBackend;
pub use generator::PromptGenerator;
