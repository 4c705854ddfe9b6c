mod config;
mod errors;
mod import;
mod llm_client;
mod models;
mod render;
mod routes;
mod session;
mod state;
mod tailoring;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::import::oauth::OauthBackendClient;
use crate::llm_client::{LlmClient, QueryOptions};
use crate::render::{PageConfig, TextRenderer};
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; every variable has a default
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log,
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CovRes API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(QueryOptions::from_config(&config));
    info!(
        "LLM client initialized (model: {}, endpoint: {})",
        llm.options().model_id,
        llm.options().endpoint_url
    );

    // Shared HTTP client for scraping and the OAuth backend
    let http = reqwest::Client::builder()
        .user_agent(concat!("covres-api/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let oauth = OauthBackendClient::new(http.clone(), config.oauth_backend_url.clone());
    info!("OAuth backend: {}", config.oauth_backend_url);

    let page_config = PageConfig::default();
    info!(
        "Text renderer page: {} columns x {} lines",
        page_config.columns, page_config.lines_per_page
    );

    // Sessions live in memory; idle ones are swept in the background
    let session_ttl = Duration::from_secs(config.session_ttl_secs);
    let sessions = SessionStore::new(session_ttl);
    sessions.spawn_eviction(SESSION_SWEEP_PERIOD.min(session_ttl));
    info!("Session TTL: {}s", config.session_ttl_secs);

    // Build app state
    let state = AppState {
        sessions,
        llm: Arc::new(llm),
        http,
        oauth,
        renderer: Arc::new(TextRenderer::new(page_config)),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the wizard UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
