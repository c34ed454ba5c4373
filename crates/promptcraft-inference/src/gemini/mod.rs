//! Gemini generative-language backend.
//!
//! Sends the instruction and the inline image to
//! `{base_url}/models/{model}:generateContent?key={api_key}` and reads the
//! generated text from `candidates[0].content.parts[0].text`.
//!
//! # Example
//!
//! ```rust,no_run
//! use promptcraft_core::{ImagePayload, PromptBackend, PromptRequest};
//! use promptcraft_inference::gemini::{GeminiBackend, GeminiConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = GeminiBackend::new(GeminiConfig::new("my-api-key")).unwrap();
//!     let image = ImagePayload::from_bytes(&std::fs::read("photo.png").unwrap(), None).unwrap();
//!     let text = backend.generate_prompt(&PromptRequest::new(image)).await.unwrap();
//!     println!("{:?}", text);
//! }
//! ```

mod backend;
mod error;
mod types;

pub use crate::config::GeminiConfig;
pub use backend::GeminiBackend;
pub use error::{to_core_error, GeminiErrorCode};
pub use types::{
    extract_text, Content, GeminiError, GeminiErrorResponse, GenerateContentRequest, InlineData,
    Part,
};
