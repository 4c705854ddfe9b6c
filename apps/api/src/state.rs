use std::sync::Arc;

use crate::config::Config;
use crate::import::oauth::OauthBackendClient;
use crate::llm_client::TextGenerator;
use crate::render::DocumentRenderer;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Model client used for tailoring and cover letters. `LlmClient` in production.
    pub llm: Arc<dyn TextGenerator>,
    /// Plain HTTP client for profile-page scraping.
    pub http: reqwest::Client,
    pub oauth: OauthBackendClient,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub config: Config,
}
