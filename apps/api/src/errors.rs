use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::credentials::CredentialError;
use crate::export::ExportError;
use crate::llm_client::LlmError;
use crate::sourcing::SourcingError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(#[from] LlmError),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// An upstream identity provider refused us.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<SourcingError> for AppError {
    fn from(err: SourcingError) -> Self {
        match err {
            SourcingError::MissingTitle => AppError::Validation(err.to_string()),
            // fetch_postings never returns this; anything else leaking it is a bug.
            SourcingError::ProviderUnavailable(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::MissingTokens => AppError::Validation(err.to_string()),
            CredentialError::Config(msg) => AppError::Internal(anyhow::anyhow!(msg)),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::ExportFailed(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::GenerationUnavailable(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "GENERATION_UNAVAILABLE",
                    "The text generation backend is unavailable, please retry".to_string(),
                )
            }
            AppError::ExportFailed(msg) => {
                tracing::error!("Export error: {msg}");
                (StatusCode::BAD_GATEWAY, "EXPORT_FAILED", msg.clone())
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
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
