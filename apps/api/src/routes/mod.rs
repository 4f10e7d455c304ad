pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::credentials::handlers as auth;
use crate::generation::handlers as resumes;
use crate::sourcing::handlers as jobs;
use crate::state::AppState;
use crate::tailoring::handlers as tailoring;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs API
        .route("/api/v1/jobs/search", post(jobs::handle_search_jobs))
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .route("/api/v1/jobs/:id/score", post(jobs::handle_score_job))
        // Resume API
        .route(
            "/api/v1/resumes/insights",
            post(resumes::handle_resume_insights),
        )
        // Tailoring API
        .route("/api/v1/tailoring", post(tailoring::handle_create_tailoring))
        .route(
            "/api/v1/tailoring/actions",
            post(tailoring::handle_tailoring_action),
        )
        .route(
            "/api/v1/tailoring/save",
            post(tailoring::handle_save_to_drive),
        )
        // Auth API
        .route(
            "/api/v1/auth/google/url",
            get(auth::handle_google_auth_url),
        )
        .route(
            "/api/v1/auth/google/callback",
            get(auth::handle_google_callback),
        )
        .with_state(state)
}
