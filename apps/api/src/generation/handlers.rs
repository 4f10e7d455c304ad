//! Axum route handlers for the Resume insights API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::insights::{extract_resume_insights, InsightsOutcome, ResumeInsights};
use crate::state::AppState;
use crate::tailoring::resolve_resume;

#[derive(Debug, Deserialize)]
pub struct InsightsRequest {
    pub user_id: Uuid,
    /// Latest upload when omitted.
    pub resume_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct InsightsResponse {
    pub resume_id: Uuid,
    pub insights: ResumeInsights,
    /// "extracted", "backend_unavailable" or "unparseable".
    pub source: &'static str,
}

/// POST /api/v1/resumes/insights
///
/// Never fails on backend trouble; `source` tells the caller which path ran.
pub async fn handle_resume_insights(
    State(state): State<AppState>,
    Json(req): Json<InsightsRequest>,
) -> Result<Json<InsightsResponse>, AppError> {
    let resume = resolve_resume(state.store.as_ref(), req.user_id, req.resume_id).await?;

    let outcome = extract_resume_insights(&state.llm, &resume.parsed_text).await;
    let source = match &outcome {
        InsightsOutcome::Extracted(_) => "extracted",
        InsightsOutcome::BackendUnavailable(_) => "backend_unavailable",
        InsightsOutcome::Unparseable(_) => "unparseable",
    };

    Ok(Json(InsightsResponse {
        resume_id: resume.id,
        insights: outcome.into_insights(),
        source,
    }))
}
