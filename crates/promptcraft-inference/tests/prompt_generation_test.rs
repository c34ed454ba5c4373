//! End-to-end generation against mocked identity and Gemini endpoints.
//!
//! Covers the four user-visible scenarios: generated text, failed sign-in,
//! exhausted rate-limit retries and a response without text.

use promptcraft_inference::defaults;
use promptcraft_inference::{
    AuthConfig, GeminiConfig, ImagePayload, PromptGenerator, PromptOutcome,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-test";
const GENERATE_PATH: &str = "/models/gemini-test:generateContent";
const SIGN_UP_PATH: &str = "/accounts:signUp";

/// PNG signature followed by the start of an IHDR chunk.
const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

fn generator(server: &MockServer, max_retries: u32) -> PromptGenerator {
    let mut gemini = GeminiConfig::new("gemini-key");
    gemini.base_url = server.uri();
    gemini.model = MODEL.to_string();
    gemini.max_retries = max_retries;
    gemini.initial_delay_ms = 1;

    let mut auth = AuthConfig::new("web-key");
    auth.base_url = server.uri();

    PromptGenerator::from_config(gemini, auth).expect("Failed to create generator")
}

fn image() -> ImagePayload {
    ImagePayload::from_bytes(PNG_HEADER, None).expect("valid image")
}

async fn mount_sign_up_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(SIGN_UP_PATH))
        .and(query_param("key", "web-key"))
        .and(body_partial_json(json!({"returnSecureToken": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "identitytoolkit#SignupNewUserResponse",
            "idToken": "id-token",
            "refreshToken": "refresh-token",
            "expiresIn": "3600",
            "localId": "anon-uid"
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn text_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

fn rate_limit_response() -> ResponseTemplate {
    ResponseTemplate::new(429).set_body_json(json!({
        "error": {
            "code": 429,
            "message": "Resource has been exhausted (e.g. check quota).",
            "status": "RESOURCE_EXHAUSTED"
        }
    }))
}

#[tokio::test]
async fn test_generates_prompt_from_image() {
    let server = MockServer::start().await;
    mount_sign_up_ok(&server).await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "gemini-key"))
        .and(body_partial_json(json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {"text": defaults::PROMPT_INSTRUCTION},
                    {"inlineData": {"mimeType": "image/png"}}
                ]
            }]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(text_response("A studio-lit portrait...")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = generator(&server, 5).generate(image()).await;

    assert_eq!(outcome.display_text(), "A studio-lit portrait...");
    assert_eq!(
        outcome,
        PromptOutcome::Generated {
            prompt: "A studio-lit portrait...".to_string(),
            attempts: 1,
            fallback: false,
        }
    );
}

#[tokio::test]
async fn test_sign_in_failure_never_calls_gemini() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SIGN_UP_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "ADMIN_ONLY_OPERATION"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = generator(&server, 5).generate(image()).await;

    assert_eq!(outcome, PromptOutcome::AuthFailed);
    assert_eq!(outcome.display_text(), defaults::AUTH_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_rate_limit_exhausts_retries() {
    let server = MockServer::start().await;
    mount_sign_up_ok(&server).await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(rate_limit_response())
        .expect(6)
        .mount(&server)
        .await;

    let outcome = generator(&server, 5).generate(image()).await;

    assert_eq!(outcome, PromptOutcome::GenerationFailed { attempts: 6 });
    assert_eq!(outcome.display_text(), defaults::GENERATION_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    let server = MockServer::start().await;
    mount_sign_up_ok(&server).await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(rate_limit_response())
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Golden hour")))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = generator(&server, 5).generate(image()).await;

    assert_eq!(outcome.display_text(), "Golden hour");
    assert_eq!(outcome.attempts(), 3);
}

#[tokio::test]
async fn test_missing_text_uses_fallback_prompt() {
    let server = MockServer::start().await;
    mount_sign_up_ok(&server).await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = generator(&server, 5).generate(image()).await;

    assert_eq!(outcome.display_text(), defaults::FALLBACK_PROMPT);
    assert!(outcome.is_success());
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let server = MockServer::start().await;
    mount_sign_up_ok(&server).await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "Internal error", "status": "INTERNAL"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = generator(&server, 5).generate(image()).await;

    assert_eq!(outcome, PromptOutcome::GenerationFailed { attempts: 1 });
}

#[tokio::test]
async fn test_non_json_success_body_is_a_failure() {
    let server = MockServer::start().await;
    mount_sign_up_ok(&server).await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = generator(&server, 5).generate(image()).await;

    assert_eq!(outcome.display_text(), defaults::GENERATION_FAILED_MESSAGE);
}
