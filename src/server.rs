//! HTTP server exposing the dashboard page and the headlines proxy.
//!
//! # Routes
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/` | The dashboard page (HTML, embedded at compile time) |
//! | GET | `/get_news` | Upstream headlines JSON, or `{"error": "..."}` with 500 |
//! | GET | `/health` | `OK` |
//!
//! Handlers are stateless apart from the read-only [`AppState`]; each request
//! performs at most one upstream call and nothing is shared between requests.

use crate::api::NewsApiClient;
use crate::config::Settings;
use crate::error::ProxyError;
use crate::utils::shutdown_signal;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::any::Any;
use std::error::Error;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

/// The dashboard page served at `/`.
const DASHBOARD_HTML: &str = include_str!("dashboard.html");

/// Read-only state shared by every handler.
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,
    pub client: NewsApiClient,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, reqwest::Error> {
        let client = NewsApiClient::new(&settings)?;
        Ok(Self { settings, client })
    }
}

/// Build the router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    with_middleware(routes(state))
}

fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/get_news", get(get_news))
        .route("/health", get(health))
        .with_state(state)
}

fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

/// Bind `settings.bind` and serve until Ctrl+C or SIGTERM.
pub async fn run(settings: Settings) -> Result<(), Box<dyn Error>> {
    if settings.api_key().is_err() {
        warn!("=======================================================");
        warn!("  NO USABLE NEWS API KEY CONFIGURED");
        warn!("  Every /get_news request will fail with a configuration");
        warn!("  error until the server is restarted with a key.");
        warn!("  ");
        warn!("  Set NEWS_API_KEY, pass --api-key, or add api_key to the");
        warn!("  file given with --config.");
        warn!("=======================================================");
    }

    let addr = settings.bind;
    let state = Arc::new(AppState::new(settings)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

async fn health() -> &'static str {
    "OK"
}

/// Proxy one top-headlines request upstream.
///
/// On success the upstream body and status are forwarded untouched. Every
/// failure becomes a [`ProxyError`], which renders as a 500 error payload.
#[instrument(level = "info", skip_all)]
async fn get_news(State(state): State<Arc<AppState>>) -> Result<Response, ProxyError> {
    let result = async {
        let api_key = state.settings.api_key()?;
        state.client.fetch_top_headlines(api_key).await
    }
    .await;

    match result {
        Ok(headlines) => {
            info!(
                status = %headlines.status,
                article_count = headlines.article_count,
                "Forwarding upstream headlines"
            );
            Ok((
                headlines.status,
                [(header::CONTENT_TYPE, "application/json")],
                headlines.body,
            )
                .into_response())
        }
        Err(e) => {
            error!(kind = e.kind(), error = %e, "Headlines request failed");
            Err(e)
        }
    }
}

/// Render a handler panic as the unexpected-error payload.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    error!(panic = %detail, "Handler panicked");
    ProxyError::Unexpected(detail).into_response()
}
