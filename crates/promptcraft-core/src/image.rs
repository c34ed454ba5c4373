//! Image intake: validation, MIME detection and base64 encoding.

use base64::Engine;

use crate::defaults;
use crate::error::{Error, Result};

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// An uploaded image, ready to be embedded as inline data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    encoded: String,
    byte_len: usize,
}

impl ImagePayload {
    /// Build a payload from raw file bytes.
    ///
    /// The MIME type is detected from magic bytes. When detection is
    /// inconclusive the declared type is used if it is an image type, and
    /// `image/png` otherwise. Non-image content is rejected.
    pub fn from_bytes(bytes: &[u8], declared_mime: Option<&str>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidInput("Image data is empty".to_string()));
        }
        if bytes.len() > defaults::MAX_IMAGE_BYTES {
            return Err(Error::InvalidInput(format!(
                "Image is {} bytes, maximum is {}",
                bytes.len(),
                defaults::MAX_IMAGE_BYTES
            )));
        }

        let mime_type = resolve_mime_type(bytes, declared_mime)?;

        Ok(Self {
            mime_type,
            encoded: base64::engine::general_purpose::STANDARD.encode(bytes),
            byte_len: bytes.len(),
        })
    }

    /// Build a payload from browser-supplied base64, with or without a
    /// `data:<mime>;base64,` prefix.
    pub fn from_base64(data: &str, declared_mime: Option<&str>) -> Result<Self> {
        let (url_mime, raw) = split_data_url(data.trim());
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(raw)
            .map_err(|e| Error::InvalidInput(format!("Invalid base64 image data: {}", e)))?;

        Self::from_bytes(&bytes, declared_mime.or(url_mime))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Standard base64 encoding of the image bytes.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Size of the decoded image in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Decode the transfer payload back into raw bytes.
    pub fn decode_payload(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.encoded)
            .map_err(|e| Error::Internal(format!("Payload is not valid base64: {}", e)))
    }
}

fn split_data_url(data: &str) -> (Option<&str>, &str) {
    if let Some(rest) = data.strip_prefix(DATA_URL_PREFIX) {
        if let Some(idx) = rest.find(BASE64_MARKER) {
            let mime = &rest[..idx];
            let payload = &rest[idx + BASE64_MARKER.len()..];
            return ((!mime.is_empty()).then_some(mime), payload);
        }
    }
    (None, data)
}

fn resolve_mime_type(bytes: &[u8], declared_mime: Option<&str>) -> Result<String> {
    if let Some(kind) = infer::get(bytes) {
        if kind.matcher_type() == infer::MatcherType::Image {
            return Ok(kind.mime_type().to_string());
        }
        return Err(Error::InvalidInput(format!(
            "Expected an image, got {}",
            kind.mime_type()
        )));
    }

    match declared_mime.map(str::trim) {
        Some(mime) if mime.starts_with("image/") => Ok(mime.to_string()),
        Some(mime) if !mime.is_empty() && mime != "application/octet-stream" => Err(
            Error::InvalidInput(format!("Expected an image, got {}", mime)),
        ),
        _ => Ok(defaults::DEFAULT_IMAGE_MIME.to_string()),
    }
}
