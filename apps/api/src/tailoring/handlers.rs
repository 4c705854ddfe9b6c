//! Axum route handlers for tailoring and cover letters.
//!
//! Model output that cannot be used still answers 200 with `applied: false`;
//! only an unreachable or failing model turns into an error status.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Local;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ExperienceEntry, ProjectEntry, Record};
use crate::state::AppState;
use crate::tailoring::tailor::{
    tailor_experience, tailor_projects, tailor_summary, write_cover_letter, TailorFailure,
};

#[derive(Debug, Serialize)]
pub struct TailorListResponse<T> {
    pub applied: bool,
    /// The tailored entries when applied, otherwise the originals.
    pub items: Vec<T>,
    pub failure: Option<TailorFailure>,
}

#[derive(Debug, Serialize)]
pub struct TextResponse {
    pub text: String,
}

/// POST /api/v1/sessions/:id/tailor/experience
pub async fn handle_tailor_experience(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TailorListResponse<ExperienceEntry>>, AppError> {
    let record = state.sessions.get(id).await?.record;
    require_job_description(&record)?;
    if record.experience.is_empty() {
        return Err(AppError::Validation(
            "Add at least one experience entry before tailoring.".to_string(),
        ));
    }

    let tailored =
        tailor_experience(state.llm.as_ref(), &record.experience, &record.job_description).await?;
    if tailored.applied() {
        let items = tailored.items.clone();
        state
            .sessions
            .update(id, |session| session.record.tailored_experience = items)
            .await?;
        info!("Session {id}: stored {} tailored experience entries", tailored.items.len());
    }

    Ok(Json(TailorListResponse {
        applied: tailored.applied(),
        items: tailored.items,
        failure: tailored.failure,
    }))
}

/// POST /api/v1/sessions/:id/tailor/projects
pub async fn handle_tailor_projects(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TailorListResponse<ProjectEntry>>, AppError> {
    let record = state.sessions.get(id).await?.record;
    require_job_description(&record)?;
    if record.projects.is_empty() {
        return Err(AppError::Validation(
            "Add at least one project before tailoring.".to_string(),
        ));
    }

    let tailored =
        tailor_projects(state.llm.as_ref(), &record.projects, &record.job_description).await?;
    if tailored.applied() {
        let items = tailored.items.clone();
        state
            .sessions
            .update(id, |session| session.record.tailored_projects = items)
            .await?;
        info!("Session {id}: stored {} tailored projects", tailored.items.len());
    }

    Ok(Json(TailorListResponse {
        applied: tailored.applied(),
        items: tailored.items,
        failure: tailored.failure,
    }))
}

/// POST /api/v1/sessions/:id/tailor/summary
pub async fn handle_tailor_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TextResponse>, AppError> {
    let record = state.sessions.get(id).await?.record;
    require_job_description(&record)?;

    let text = tailor_summary(state.llm.as_ref(), &record).await?;
    let stored = text.clone();
    state
        .sessions
        .update(id, |session| session.record.tailored_summary = stored)
        .await?;
    Ok(Json(TextResponse { text }))
}

/// POST /api/v1/sessions/:id/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TextResponse>, AppError> {
    let record = state.sessions.get(id).await?.record;
    require_job_description(&record)?;

    let today = Local::now().date_naive();
    let text = write_cover_letter(state.llm.as_ref(), &record, today).await?;
    let stored = text.clone();
    state
        .sessions
        .update(id, |session| session.cover_letter = Some(stored))
        .await?;
    Ok(Json(TextResponse { text }))
}

fn require_job_description(record: &Record) -> Result<(), AppError> {
    if record.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Paste the target job description first.".to_string(),
        ));
    }
    Ok(())
}
