//! Data models for the upstream headlines payload and the proxy's error envelope.
//!
//! This module defines the structures exchanged over the wire:
//! - [`HeadlinesResponse`]: The top-headlines document returned by NewsAPI
//! - [`Article`]: A single headline inside that document
//! - [`ErrorPayload`]: The `{"error": "..."}` envelope returned on any failure
//!
//! The upstream schema uses camelCase field names (`urlToImage`, `publishedAt`,
//! `totalResults`), hence the `#[allow(non_snake_case)]` attributes. Every
//! article field is optional because NewsAPI routinely sends `null` or omits
//! them.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// The publisher block attached to each article.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ArticleSource {
    /// NewsAPI's identifier for the publisher, when it has one.
    pub id: Option<String>,
    /// Display name of the publisher.
    pub name: Option<String>,
}

/// A single headline as returned by the upstream API.
///
/// # JSON Schema
///
/// ```text
/// {
///   "source": {"id": null, "name": "Example"},
///   "author": "Jane Doe",
///   "title": "Headline",
///   "description": "Lede",
///   "url": "https://example.com/story",
///   "urlToImage": "https://example.com/story.jpg",
///   "publishedAt": "2025-06-27T09:46:34Z",
///   "content": "First few hundred characters…"
/// }
/// ```
#[allow(non_snake_case)]
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Article {
    #[serde(default)]
    pub source: Option<ArticleSource>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub urlToImage: Option<String>,
    #[serde(default)]
    pub publishedAt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Article {
    /// Parse `publishedAt` as an RFC 3339 timestamp.
    ///
    /// Returns `None` when the field is absent or not a valid timestamp.
    pub fn published_at(&self) -> Option<DateTime<FixedOffset>> {
        self.publishedAt
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
    }
}

/// The top-headlines document returned by the upstream API.
///
/// The proxy only uses this type to validate the upstream body at the
/// boundary; the bytes forwarded to the browser are the upstream's own.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HeadlinesResponse {
    /// `"ok"` on success. Passed through, never reinterpreted.
    pub status: String,
    /// Total number of results upstream has for the query.
    #[serde(default)]
    pub totalResults: Option<u64>,
    /// The headlines themselves. Treated as empty when absent.
    #[serde(default)]
    pub articles: Vec<Article>,
}

impl HeadlinesResponse {
    /// The most recent `publishedAt` across all articles, if any parse.
    pub fn newest_published(&self) -> Option<DateTime<FixedOffset>> {
        self.articles.iter().filter_map(Article::published_at).max()
    }
}

/// The single-field error envelope returned by the proxy on every failure path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorPayload {
    /// Human-readable description of what went wrong.
    pub error: String,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
