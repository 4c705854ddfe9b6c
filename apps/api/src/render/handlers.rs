use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Local;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::render::{DocumentRenderer, ExperienceVariant};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ResumeQuery {
    #[serde(default)]
    pub tailored: bool,
}

/// GET /api/v1/sessions/:id/documents/resume?tailored=true
pub async fn handle_resume_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ResumeQuery>,
) -> Result<Response, AppError> {
    let record = state.sessions.get(id).await?.record;
    let variant = ExperienceVariant::from_flag(query.tailored);
    let bytes = state.renderer.render_resume(&record, variant)?;
    info!("Session {id}: rendered {variant:?} resume ({} bytes)", bytes.len());
    Ok(attachment(state.renderer.as_ref(), "resume", bytes))
}

/// GET /api/v1/sessions/:id/documents/cover-letter
pub async fn handle_cover_letter_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = state.sessions.get(id).await?;
    let letter = session.cover_letter.ok_or_else(|| {
        AppError::Validation("Generate a cover letter before downloading it.".to_string())
    })?;

    let today = Local::now().date_naive();
    let bytes = state
        .renderer
        .render_cover_letter(&letter, &session.record, today)?;
    Ok(attachment(state.renderer.as_ref(), "cover_letter", bytes))
}

fn attachment(renderer: &dyn DocumentRenderer, stem: &str, bytes: Vec<u8>) -> Response {
    let disposition = format!(
        "attachment; filename=\"{stem}.{}\"",
        renderer.file_extension()
    );
    (
        [
            (header::CONTENT_TYPE, renderer.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}
