use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header::CONTENT_TYPE, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::extract;
use crate::models::ExtractedEvent;

#[derive(Clone)]
pub struct AppState {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

pub fn build_client(fetch_timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(fetch_timeout_secs))
        .user_agent("retreat-scrape/0.1")
        .build()
        .context("failed to build http client")
}

pub fn build_app(client: reqwest::Client) -> Router {
    // The admin UI may be served from anywhere, so cross-origin access is
    // fully permissive.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/extract-event", post(extract_event_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { client })
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn extract_event_handler(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractedEvent>, HandlerError> {
    let url = request.url.trim().to_string();
    validate_url(&url)?;

    let html = fetch_html(&state.client, &url).await.map_err(|err| {
        tracing::warn!(url, error = %err, "fetch failed");
        error_response(
            StatusCode::BAD_GATEWAY,
            format!("Failed to fetch event page: {err}"),
        )
    })?;

    // Parsed documents are not Send, so the whole CPU-bound pipeline runs
    // on a blocking thread.
    let url_for_task = url.clone();
    let event = tokio::task::spawn_blocking(move || {
        extract::extract_event(&html, &url_for_task)
    })
    .await
    .map_err(|err| {
        tracing::error!(error = %err, "extraction task panicked");
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to extract event data from URL".to_string(),
        )
    })?
    .map_err(|err| {
        tracing::warn!(url, error = %err, "extraction failed");
        error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Failed to extract event data from URL: {err}"),
        )
    })?;

    Ok(Json(event))
}

fn validate_url(url: &str) -> Result<(), HandlerError> {
    if url.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "A URL is required".to_string(),
        ));
    }
    let parsed = reqwest::Url::parse(url).map_err(|_| {
        error_response(StatusCode::BAD_REQUEST, format!("Invalid URL: {url}"))
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Unsupported URL scheme: {}", parsed.scheme()),
        ));
    }
    Ok(())
}

async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request failed for {url}"))?;
    let response = response
        .error_for_status()
        .with_context(|| format!("non-success status for {url}"))?;
    response
        .text()
        .await
        .with_context(|| format!("unable to read response body for {url}"))
}

fn error_response(status: StatusCode, message: String) -> HandlerError {
    (status, Json(ErrorResponse { error: message }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_invalid_and_non_http_urls() {
        assert!(validate_url("").is_err());
        assert!(validate_url("not a url").is_err());
        assert!(validate_url("ftp://example.com/events").is_err());
        assert!(validate_url("https://example.com/events/sit").is_ok());
        assert!(validate_url("http://example.com/events/sit").is_ok());
    }

    #[test]
    fn error_payload_serializes_with_error_key() {
        let (_, Json(body)) = error_response(StatusCode::BAD_REQUEST, "nope".to_string());
        let json = serde_json::to_value(&body).expect("serializes");
        assert_eq!(json, serde_json::json!({"error": "nope"}));
    }
}
