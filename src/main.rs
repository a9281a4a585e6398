//! # News Dashboard
//!
//! A small web server that proxies the NewsAPI.org top-headlines endpoint and
//! serves a dashboard page that polls it.
//!
//! ## Features
//!
//! - `GET /` serves a self-refreshing dashboard (every five minutes)
//! - `GET /get_news` forwards one request upstream and mirrors the JSON back
//! - Every failure is reported as a uniform `{"error": "..."}` payload
//! - Configuration from flags, environment variables, or a YAML file
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=abc123 news_dashboard --bind 0.0.0.0:5000
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: CLI, environment and file layers merge into one `Settings`
//! 2. **Proxy**: `/get_news` validates the credential, calls upstream once, and
//!    forwards the body or maps the failure to an error payload
//! 3. **Dashboard**: the embedded page fetches `/get_news` on load and on a timer

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod api;
mod cli;
mod config;
mod error;
mod models;
mod server;
mod utils;

use cli::Cli;
use config::Settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "news_dashboard starting up");

    let args = Cli::parse();
    debug!(config = ?args.config, "Parsed CLI arguments");

    let settings = match Settings::load(&args).await {
        Ok(settings) => settings,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        bind = %settings.bind,
        country = %settings.query.country,
        page_size = settings.query.page_size,
        upstream = %settings.upstream_url,
        timeout_secs = settings.timeout.as_secs(),
        api_key_configured = settings.api_key().is_ok(),
        "Loaded configuration"
    );

    server::run(settings).await
}
