//! Axum route handlers for profile import.
//!
//! Imports are soft: a parse failure still answers 200 with whatever was
//! recovered, merged into the session, and the failure text in `warning`.

use std::time::Duration;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::import::{parse_upload, scrape::fetch_public_profile};
use crate::models::{ParsedProfile, Record};
use crate::session::merge::merge;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UrlImportRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct OauthImportRequest {
    pub profile_id: String,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// The session's Record after merging.
    pub record: Record,
    /// What the import recovered, before merging.
    pub imported: ParsedProfile,
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

/// POST /api/v1/sessions/:id/import/export
pub async fn handle_import_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    state.sessions.get(id).await?;

    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        let Some(file_name) = field.file_name().map(String::from) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
        upload = Some((file_name, bytes));
        break;
    }
    let (file_name, bytes) =
        upload.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;

    info!("Session {id}: importing export '{file_name}' ({} bytes)", bytes.len());
    let parsed = parse_upload(&file_name, &bytes, state.config.max_archive_bytes);
    merge_into_session(&state, id, parsed).await
}

/// POST /api/v1/sessions/:id/import/url
pub async fn handle_import_url(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UrlImportRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    if req.url.trim().is_empty() {
        return Err(AppError::Validation(
            "Please paste a profile URL.".to_string(),
        ));
    }
    state.sessions.get(id).await?;

    let timeout = Duration::from_secs(state.config.scrape_timeout_secs);
    let parsed = fetch_public_profile(&state.http, &req.url, timeout).await;
    merge_into_session(&state, id, parsed).await
}

/// GET /api/v1/oauth/auth-url
pub async fn handle_oauth_auth_url(
    State(state): State<AppState>,
) -> Result<Json<AuthUrlResponse>, AppError> {
    let auth_url = state
        .oauth
        .auth_url()
        .await
        .map_err(|e| AppError::Upstream(format!("Could not initiate OAuth: {e}")))?
        .ok_or_else(|| {
            AppError::Upstream("OAuth backend did not return an auth_url".to_string())
        })?;
    Ok(Json(AuthUrlResponse { auth_url }))
}

/// POST /api/v1/sessions/:id/import/oauth
pub async fn handle_import_oauth(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<OauthImportRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    let profile_id = req.profile_id.trim();
    if profile_id.is_empty() {
        return Err(AppError::Validation(
            "Enter the profile id printed by the OAuth backend callback.".to_string(),
        ));
    }
    state.sessions.get(id).await?;

    let parsed = match state.oauth.fetch_profile(profile_id).await {
        Ok(profile) if !profile.is_empty() => profile.into_parsed(),
        Ok(_) => {
            let mut parsed = ParsedProfile::default();
            parsed.note_error(format!("No profile stored for id {profile_id}"));
            parsed
        }
        Err(e) => {
            warn!("OAuth profile lookup for {profile_id} failed: {e}");
            let mut parsed = ParsedProfile::default();
            parsed.note_error(format!("Failed to fetch profile: {e}"));
            parsed
        }
    };
    merge_into_session(&state, id, parsed).await
}

async fn merge_into_session(
    state: &AppState,
    id: Uuid,
    parsed: ParsedProfile,
) -> Result<Json<ImportResponse>, AppError> {
    let record = state
        .sessions
        .update(id, |session| {
            merge(&parsed, &mut session.record);
            session.record.clone()
        })
        .await?;

    Ok(Json(ImportResponse {
        record,
        warning: parsed.error.clone(),
        imported: parsed,
    }))
}
