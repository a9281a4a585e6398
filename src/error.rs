//! Error taxonomy for the headlines proxy.
//!
//! Every server-side failure collapses into one [`ProxyError`] variant, and
//! every variant renders as the same [`ErrorPayload`] shape with HTTP 500 so
//! the dashboard has exactly one parsing path.
//!
//! | Variant | Detected | Outbound call made? |
//! |---------|----------|---------------------|
//! | [`ProxyError::MissingApiKey`] | Before the request | No |
//! | [`ProxyError::Transport`] | DNS, connect, timeout, non-2xx | Yes |
//! | [`ProxyError::InvalidBody`] | 2xx with a body that is not a headlines document | Yes |
//! | [`ProxyError::Unexpected`] | Anything else, including handler panics | Maybe |

use crate::models::ErrorPayload;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::error::Error as StdError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// The credential is unset, empty, or still the placeholder value.
    #[error(
        "Invalid API Key. Set NEWS_API_KEY (or pass --api-key) to your actual key from NewsAPI.org."
    )]
    MissingApiKey,

    /// The upstream could not be reached or answered with a non-2xx status.
    #[error("Failed to fetch news from NewsAPI: {0}")]
    Transport(String),

    /// The upstream answered 2xx but the body is not a headlines document.
    #[error("Failed to fetch news from NewsAPI: invalid response body: {0}")]
    InvalidBody(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl ProxyError {
    /// Short machine-friendly label used as a tracing field.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::MissingApiKey => "configuration",
            ProxyError::Transport(_) => "transport",
            ProxyError::InvalidBody(_) => "invalid_body",
            ProxyError::Unexpected(_) => "unexpected",
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload::new(self.to_string())
    }
}

impl From<reqwest::Error> for ProxyError {
    // The request URL carries the credential in its query string, so it is
    // stripped before the message reaches logs or the browser.
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        let message = describe(&e);
        if e.is_decode() {
            ProxyError::InvalidBody(message)
        } else if e.is_builder() {
            ProxyError::Unexpected(message)
        } else {
            ProxyError::Transport(message)
        }
    }
}

/// Render an error with its whole `source()` chain, e.g.
/// `error sending request: client error (Connect): tcp connect error: Connection refused`.
///
/// reqwest's own `Display` only names the error kind. Timeouts are prefixed
/// so they read differently from refused connections.
fn describe(e: &reqwest::Error) -> String {
    let mut message = chain_message(e);
    if e.is_timeout() && !message.contains("timed out") {
        message = format!("request timed out: {message}");
    }
    message
}

fn chain_message(e: &dyn StdError) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // Some layers repeat their inner error verbatim.
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(self.payload())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_message_mentions_api_key() {
        let payload = ProxyError::MissingApiKey.payload();
        assert!(payload.error.contains("API Key"));
    }

    #[test]
    fn test_transport_message_includes_cause() {
        let err = ProxyError::Transport("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to fetch news from NewsAPI: connection refused"
        );
        assert_eq!(err.kind(), "transport");
    }

    #[derive(Debug, Error)]
    #[error("error sending request")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("tcp connect error")]
    struct Inner(#[source] std::io::Error);

    #[test]
    fn test_chain_message_includes_every_cause() {
        let err = Outer(Inner(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Connection refused",
        )));
        assert_eq!(
            chain_message(&err),
            "error sending request: tcp connect error: Connection refused"
        );
    }

    #[test]
    fn test_chain_message_skips_repeated_text() {
        let err = Outer(Inner(std::io::Error::new(
            std::io::ErrorKind::Other,
            "tcp connect error",
        )));
        assert_eq!(chain_message(&err), "error sending request: tcp connect error");
    }

    #[test]
    fn test_unexpected_message_prefix() {
        let err = ProxyError::Unexpected("boom".to_string());
        assert!(err.to_string().starts_with("An unexpected error occurred:"));
    }

    #[tokio::test]
    async fn test_into_response_is_500_with_error_payload() {
        let response = ProxyError::InvalidBody("expected value".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let payload: ErrorPayload = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            payload.error,
            "Failed to fetch news from NewsAPI: invalid response body: expected value"
        );
    }
}
