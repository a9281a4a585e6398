//! Upstream NewsAPI top-headlines client.
//!
//! This module owns the single outbound call the proxy makes. A request is
//! built from the fixed [`HeadlineQuery`] plus the configured credential,
//! sent once with no retries, and the response is classified into either the
//! upstream's own bytes (on success) or a [`ProxyError`].
//!
//! # Boundary Validation
//!
//! A 2xx body is parsed into [`HeadlinesResponse`] before it is accepted, so
//! malformed upstream documents never reach the browser. The bytes returned
//! to the caller are the upstream's own, untouched, which keeps the response
//! an exact mirror of what NewsAPI sent.

use crate::config::{HeadlineQuery, Settings};
use crate::error::ProxyError;
use crate::models::HeadlinesResponse;
use crate::utils::truncate_for_log;
use axum::body::Bytes;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// A successful upstream answer, ready to be forwarded verbatim.
#[derive(Debug, Clone)]
pub struct UpstreamHeadlines {
    /// The upstream's HTTP status (always 2xx here).
    pub status: StatusCode,
    /// Raw JSON body as received.
    pub body: Bytes,
    /// Number of articles found during validation.
    pub article_count: usize,
}

/// Client for the NewsAPI top-headlines endpoint.
///
/// Holds one pooled [`reqwest::Client`] configured with the outbound timeout,
/// so a hung upstream fails the request instead of blocking it forever.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: Client,
    endpoint: Url,
    query: HeadlineQuery,
}

impl NewsApiClient {
    /// Build a client from resolved [`Settings`].
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        Self::with_timeout(
            settings.upstream_url.clone(),
            settings.query.clone(),
            settings.timeout,
        )
    }

    pub fn with_timeout(
        endpoint: Url,
        query: HeadlineQuery,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            query,
        })
    }

    /// The full request URL, credential included.
    ///
    /// Never log the return value.
    fn request_url(&self, api_key: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("country", &self.query.country)
            .append_pair("apiKey", api_key)
            .append_pair("pageSize", &self.query.page_size.to_string());
        url
    }

    /// Fetch the current top headlines.
    ///
    /// Performs exactly one GET. A connection failure, timeout or non-2xx
    /// status yields [`ProxyError::Transport`]; a 2xx body that is not a
    /// headlines document yields [`ProxyError::InvalidBody`].
    ///
    /// # Arguments
    ///
    /// * `api_key` - The validated upstream credential
    #[instrument(level = "info", skip_all, fields(endpoint = %self.endpoint, country = %self.query.country, page_size = self.query.page_size))]
    pub async fn fetch_top_headlines(&self, api_key: &str) -> Result<UpstreamHeadlines, ProxyError> {
        let t0 = Instant::now();

        let response = self
            .http
            .get(self.request_url(api_key))
            .send()
            .await
            .map_err(|e| {
                let err = ProxyError::from(e);
                warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %err, "Upstream request failed");
                err
            })?;

        let status = response.status();
        let response = response.error_for_status().map_err(|e| {
            let err = ProxyError::from(e);
            warn!(%status, error = %err, "Upstream returned non-success status");
            err
        })?;

        let body = response.bytes().await.map_err(ProxyError::from)?;

        let parsed: HeadlinesResponse = serde_json::from_slice(&body).map_err(|e| {
            error!(
                error = %e,
                body_preview = %truncate_for_log(&String::from_utf8_lossy(&body), 300),
                "Upstream body is not a headlines document"
            );
            ProxyError::InvalidBody(e.to_string())
        })?;

        let article_count = parsed.articles.len();
        info!(
            %status,
            upstream_status = %parsed.status,
            article_count,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched top headlines"
        );
        debug!(newest = ?parsed.newest_published(), total_results = ?parsed.totalResults, "Headline freshness");

        Ok(UpstreamHeadlines {
            status,
            body,
            article_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout: Duration) -> NewsApiClient {
        let endpoint = Url::parse(&format!("{}/v2/top-headlines", server.uri())).unwrap();
        let query = HeadlineQuery {
            country: "us".to_string(),
            page_size: 30,
        };
        NewsApiClient::with_timeout(endpoint, query, timeout).unwrap()
    }

    #[test]
    fn test_request_url_carries_query() {
        let query = HeadlineQuery {
            country: "gb".to_string(),
            page_size: 7,
        };
        let client = NewsApiClient::with_timeout(
            Url::parse("https://newsapi.org/v2/top-headlines").unwrap(),
            query,
            Duration::from_secs(1),
        )
        .unwrap();

        let url = client.request_url("k3y");
        assert_eq!(
            url.as_str(),
            "https://newsapi.org/v2/top-headlines?country=gb&apiKey=k3y&pageSize=7"
        );
    }

    #[tokio::test]
    async fn test_success_returns_upstream_bytes() {
        let server = MockServer::start().await;
        let body = r#"{"status":"ok","totalResults":1,"articles":[{"title":"Hello","author":null,"urlToImage":null}]}"#;

        Mock::given(method("GET"))
            .and(path("/v2/top-headlines"))
            .and(query_param("country", "us"))
            .and(query_param("apiKey", "secret"))
            .and(query_param("pageSize", "30"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let result = client.fetch_top_headlines("secret").await.unwrap();

        assert_eq!(result.status, StatusCode::OK);
        assert_eq!(result.article_count, 1);
        assert_eq!(&result.body[..], body.as_bytes());
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error_without_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string(
                r#"{"status":"error","code":"apiKeyInvalid","message":"bad key"}"#,
            ))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let err = client.fetch_top_headlines("secret").await.unwrap_err();

        assert!(matches!(err, ProxyError::Transport(_)));
        let message = err.to_string();
        assert!(message.starts_with("Failed to fetch news from NewsAPI:"));
        assert!(message.contains("401"));
        assert!(!message.contains("secret"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let err = client.fetch_top_headlines("secret").await.unwrap_err();
        assert!(matches!(err, ProxyError::InvalidBody(_)));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"status":"ok","articles":[]}"#)
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_millis(200));
        let started = Instant::now();
        let err = client.fetch_top_headlines("secret").await.unwrap_err();

        assert!(matches!(err, ProxyError::Transport(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
        let message = err.to_string();
        assert!(message.contains("timed out"), "no timeout cause in: {message}");
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_transport_error() {
        // Grab a free port and close it again so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = NewsApiClient::with_timeout(
            Url::parse(&format!("http://{addr}/v2/top-headlines")).unwrap(),
            HeadlineQuery {
                country: "us".to_string(),
                page_size: 30,
            },
            Duration::from_secs(2),
        )
        .unwrap();

        let err = client.fetch_top_headlines("secret").await.unwrap_err();
        assert!(matches!(err, ProxyError::Transport(_)));
        let message = err.to_string();
        assert!(!message.contains("secret"));
        // The connect failure itself must survive, not just "error sending request".
        assert!(
            message.to_lowercase().contains("connect"),
            "no connect cause in: {message}"
        );
        assert!(message.len() > "Failed to fetch news from NewsAPI: error sending request".len());
    }
}
