use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Record;
use crate::session::Session;
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub session: Session,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let (id, session) = state.sessions.create().await;
    (StatusCode::CREATED, Json(SessionResponse { id, session }))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    Ok(Json(SessionResponse { id, session }))
}

/// PUT /api/v1/sessions/:id/record
/// Replaces the Record wholesale with what the user edited in the wizard.
pub async fn handle_put_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(record): Json<Record>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state
        .sessions
        .update(id, |session| {
            session.record = record;
            session.clone()
        })
        .await?;
    Ok(Json(SessionResponse { id, session }))
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = state.sessions.reset(id).await?;
    Ok(Json(SessionResponse { id, session }))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
