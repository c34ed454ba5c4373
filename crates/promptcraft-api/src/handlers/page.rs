//! Upload page and health check.

use axum::{response::Html, response::IntoResponse, Json};

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// The single-page upload form.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
