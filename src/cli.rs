//! Command-line interface definitions for the news dashboard.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! All arguments can be provided via command-line flags or environment variables,
//! and any of them may also come from a YAML file passed with `--config`.
//! Flags and environment variables take precedence over the file.

use clap::Parser;
use std::net::SocketAddr;
use url::Url;

/// Command-line arguments for the news dashboard server.
///
/// Every field except `config` is optional here; defaults are applied when
/// the arguments are merged into [`crate::config::Settings`], after the
/// config file (if any) has been read.
///
/// # Examples
///
/// ```sh
/// # Serve on the default address with the key from the environment
/// NEWS_API_KEY=abc123 news_dashboard
///
/// # Different country, fewer articles, public bind
/// news_dashboard --api-key abc123 --country gb --page-size 12 --bind 0.0.0.0:8080
///
/// # Everything from a file
/// news_dashboard -c ./news_dashboard.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// NewsAPI.org API key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Address to listen on [default: 127.0.0.1:5000]
    #[arg(short, long, env = "NEWS_DASHBOARD_BIND")]
    pub bind: Option<SocketAddr>,

    /// Two-letter country code for the headline query [default: us]
    #[arg(long, env = "NEWS_COUNTRY")]
    pub country: Option<String>,

    /// Number of articles to request, 1 to 100 [default: 30]
    #[arg(long, env = "NEWS_PAGE_SIZE")]
    pub page_size: Option<u32>,

    /// Upstream top-headlines endpoint [default: https://newsapi.org/v2/top-headlines]
    #[arg(long, env = "NEWS_API_URL")]
    pub upstream_url: Option<Url>,

    /// Timeout in seconds for the upstream request [default: 10]
    #[arg(long, env = "NEWS_API_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}
