//! Axum route handlers for the Jobs API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::fit_scoring::score_match;
use crate::models::job::{JobPostingRow, JobQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobSearchRequest {
    pub user_id: Uuid,
    pub query: JobQuery,
    /// Must belong to the caller when given.
    pub resume_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct JobScoreRequest {
    pub user_id: Uuid,
    pub resume_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct JobScoreResponse {
    pub job_id: Uuid,
    pub match_score: f64,
}

/// POST /api/v1/jobs/search
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Json(req): Json<JobSearchRequest>,
) -> Result<Json<Vec<JobPostingRow>>, AppError> {
    if let Some(resume_id) = req.resume_id {
        state.store.get_resume(req.user_id, resume_id).await?;
    }

    let postings = state.job_source.fetch_postings(&req.query).await?;
    let rows = state
        .store
        .record_search(req.user_id, &req.query, &postings)
        .await?;
    Ok(Json(rows))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<JobPostingRow>, AppError> {
    let job = state.store.get_job(params.user_id, job_id).await?;
    Ok(Json(job))
}

/// POST /api/v1/jobs/:id/score
///
/// Scores afresh on every call and stores the result on the posting.
pub async fn handle_score_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(req): Json<JobScoreRequest>,
) -> Result<Json<JobScoreResponse>, AppError> {
    let job = state.store.get_job(req.user_id, job_id).await?;
    let resume = state.store.get_resume(req.user_id, req.resume_id).await?;

    let match_score = score_match(&state.llm, &resume.parsed_text, &job.description).await?;
    state.store.set_job_score(job.id, match_score).await?;

    Ok(Json(JobScoreResponse {
        job_id: job.id,
        match_score,
    }))
}
