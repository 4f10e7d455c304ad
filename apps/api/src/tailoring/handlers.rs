//! Axum route handlers for the Tailoring API.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::credentials::TokenRefresher;
use crate::errors::AppError;
use crate::models::tailoring::{DocumentField, EditAction};
use crate::state::AppState;
use crate::tailoring::{apply_edit, create_tailoring, export_artifact, resolve_resume, ExportSummary};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateTailoringRequest {
    pub user_id: Uuid,
    pub job_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub instructions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TailoringResponse {
    pub tailoring_id: Uuid,
    pub job_id: Uuid,
    pub tailored_resume_text: String,
    pub tailored_coverletter_text: String,
    pub match_score: f64,
}

#[derive(Debug, Deserialize)]
pub struct TailoringActionRequest {
    pub user_id: Uuid,
    pub tailoring_id: Uuid,
    pub action: EditAction,
    pub editor: DocumentField,
    pub user_edits: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TailoringActionResponse {
    pub updated_text: String,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SaveToDriveRequest {
    pub user_id: Uuid,
    pub tailoring_id: Uuid,
    #[serde(default = "default_true")]
    pub save_resume: bool,
    #[serde(default = "default_true")]
    pub save_cover_letter: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tailoring
pub async fn handle_create_tailoring(
    State(state): State<AppState>,
    Json(req): Json<CreateTailoringRequest>,
) -> Result<Json<TailoringResponse>, AppError> {
    let store = state.store.as_ref();
    let resume = resolve_resume(store, req.user_id, req.resume_id).await?;
    let job = store.get_job(req.user_id, req.job_id).await?;

    let artifact = create_tailoring(
        &state.llm,
        store,
        req.user_id,
        &resume,
        &job,
        req.instructions.as_deref(),
    )
    .await?;

    Ok(Json(TailoringResponse {
        tailoring_id: artifact.id,
        job_id: artifact.job_id,
        tailored_resume_text: artifact.tailored_resume_text,
        tailored_coverletter_text: artifact.tailored_coverletter_text,
        match_score: artifact.match_score,
    }))
}

/// POST /api/v1/tailoring/actions
pub async fn handle_tailoring_action(
    State(state): State<AppState>,
    Json(req): Json<TailoringActionRequest>,
) -> Result<Json<TailoringActionResponse>, AppError> {
    let updated_text = apply_edit(
        &state.llm,
        state.store.as_ref(),
        req.user_id,
        req.tailoring_id,
        &req.action,
        req.editor,
        req.user_edits.as_deref(),
    )
    .await?;

    Ok(Json(TailoringActionResponse { updated_text }))
}

/// POST /api/v1/tailoring/save
///
/// Partial success is a 200 with per-field errors; only a total failure is an error.
pub async fn handle_save_to_drive(
    State(state): State<AppState>,
    Json(req): Json<SaveToDriveRequest>,
) -> Result<Json<ExportSummary>, AppError> {
    let refresher: Arc<dyn TokenRefresher> = state.oauth.clone();
    let summary = export_artifact(
        state.store.as_ref(),
        state.documents.as_ref(),
        refresher,
        req.user_id,
        req.tailoring_id,
        req.save_resume,
        req.save_cover_letter,
    )
    .await?;

    if summary.all_failed() {
        let message = summary
            .resume_error
            .or(summary.cover_letter_error)
            .unwrap_or_default();
        return Err(AppError::ExportFailed(message));
    }
    Ok(Json(summary))
}
