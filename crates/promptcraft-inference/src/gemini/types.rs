//! Gemini `generateContent` wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use promptcraft_core::PromptRequest;

/// JSON pointer to the generated text in a response.
const TEXT_POINTER: &str = "/candidates/0/content/parts/0/text";

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl From<&PromptRequest> for GenerateContentRequest {
    fn from(request: &PromptRequest) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::Text {
                        text: request.instruction.clone(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: request.image.mime_type().to_string(),
                            data: request.image.encoded().to_string(),
                        },
                    },
                ],
            }],
        }
    }
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiErrorResponse {
    pub error: GeminiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

/// Extract `candidates[0].content.parts[0].text`.
///
/// Any other shape, or blank text, yields `None`. Non-blank text is returned verbatim.
pub fn extract_text(response: &Value) -> Option<String> {
    response
        .pointer(TEXT_POINTER)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}
