pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::import::handlers as import;
use crate::render::handlers as documents;
use crate::session::handlers as sessions;
use crate::state::AppState;
use crate::tailoring::handlers as tailoring;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/record", put(sessions::handle_put_record))
        .route(
            "/api/v1/sessions/:id/reset",
            post(sessions::handle_reset_session),
        )
        // Profile import
        .route(
            "/api/v1/sessions/:id/import/export",
            post(import::handle_import_export),
        )
        .route(
            "/api/v1/sessions/:id/import/url",
            post(import::handle_import_url),
        )
        .route(
            "/api/v1/sessions/:id/import/oauth",
            post(import::handle_import_oauth),
        )
        .route("/api/v1/oauth/auth-url", get(import::handle_oauth_auth_url))
        // Tailoring
        .route(
            "/api/v1/sessions/:id/tailor/experience",
            post(tailoring::handle_tailor_experience),
        )
        .route(
            "/api/v1/sessions/:id/tailor/projects",
            post(tailoring::handle_tailor_projects),
        )
        .route(
            "/api/v1/sessions/:id/tailor/summary",
            post(tailoring::handle_tailor_summary),
        )
        .route(
            "/api/v1/sessions/:id/cover-letter",
            post(tailoring::handle_cover_letter),
        )
        // Documents
        .route(
            "/api/v1/sessions/:id/documents/resume",
            get(documents::handle_resume_document),
        )
        .route(
            "/api/v1/sessions/:id/documents/cover-letter",
            get(documents::handle_cover_letter_document),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
