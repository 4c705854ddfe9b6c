use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Nothing here ends a session: every variant leaves the stored Record as it was.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The model endpoint refused the connection.
    #[error("{0}")]
    LlmUnavailable(String),

    #[error("LLM error: {0}")]
    Llm(String),

    /// A collaborator service (e.g. the OAuth backend) failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Document generation failed: {0}")]
    Render(#[from] RenderError),
}

impl From<LlmError> for AppError {
    fn from(error: LlmError) -> Self {
        if error.is_unreachable() {
            AppError::LlmUnavailable(error.to_string())
        } else {
            AppError::Llm(error.to_string())
        }
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::LlmUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "LLM_UNREACHABLE"),
            AppError::Llm(_) => (StatusCode::BAD_GATEWAY, "LLM_ERROR"),
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            AppError::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::LlmUnavailable(msg) => msg.clone(),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                format!("Error: {msg}")
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                msg.clone()
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                format!("Document generation failed: {e}")
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::UNREACHABLE_MESSAGE;

    #[test]
    fn test_unreachable_llm_maps_to_service_unavailable() {
        let err = AppError::from(LlmError::Unreachable);
        assert!(matches!(err, AppError::LlmUnavailable(ref m) if m == UNREACHABLE_MESSAGE));
        assert_eq!(err.status_and_code().0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_other_llm_failures_embed_underlying_text() {
        let err = AppError::from(LlmError::Api {
            status: 500,
            message: "boom".to_string(),
        });
        match &err {
            AppError::Llm(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.status_and_code(), (StatusCode::BAD_GATEWAY, "LLM_ERROR"));
    }

    #[test]
    fn test_not_found_response_status() {
        let response = AppError::NotFound("Session x not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
