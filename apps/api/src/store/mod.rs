//! Persistence seam. Handlers and the tailoring pipeline only see `Store`;
//! `PgStore` is the production implementation.
//!
//! Every lookup is scoped to the owning user. A row owned by someone else is
//! reported exactly like a missing row.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::credentials::Credential;
use crate::credentials::google::GoogleProfile;
use crate::models::job::{JobPosting, JobPostingRow, JobQuery};
use crate::models::resume::ResumeRow;
use crate::models::tailoring::{DocumentField, NewTailoring, TailoringArtifact};
use crate::models::user::User;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Records the search and persists its postings under it.
    async fn record_search(
        &self,
        user_id: Uuid,
        query: &JobQuery,
        postings: &[JobPosting],
    ) -> Result<Vec<JobPostingRow>, StoreError>;

    async fn get_job(&self, user_id: Uuid, job_id: Uuid) -> Result<JobPostingRow, StoreError>;

    async fn set_job_score(&self, job_id: Uuid, score: f64) -> Result<(), StoreError>;

    async fn get_resume(&self, user_id: Uuid, resume_id: Uuid) -> Result<ResumeRow, StoreError>;

    /// Most recently uploaded resume, if any.
    async fn latest_resume(&self, user_id: Uuid) -> Result<Option<ResumeRow>, StoreError>;

    async fn insert_tailoring(&self, new: NewTailoring) -> Result<TailoringArtifact, StoreError>;

    async fn get_tailoring(
        &self,
        user_id: Uuid,
        tailoring_id: Uuid,
    ) -> Result<TailoringArtifact, StoreError>;

    /// Last write wins at the field level.
    async fn update_tailoring_text(
        &self,
        tailoring_id: Uuid,
        field: DocumentField,
        text: &str,
    ) -> Result<(), StoreError>;

    /// Stores the URLs of fields that exported successfully. `None` leaves the
    /// stored URL untouched. Marks the artifact as saved when any URL is given.
    async fn record_export(
        &self,
        tailoring_id: Uuid,
        resume_url: Option<&str>,
        cover_letter_url: Option<&str>,
    ) -> Result<(), StoreError>;

    async fn get_user(&self, user_id: Uuid) -> Result<User, StoreError>;

    /// Creates or updates the user identified by `profile.email`. A missing
    /// refresh token keeps the one already on file.
    async fn upsert_google_user(
        &self,
        profile: &GoogleProfile,
        credential: &Credential,
    ) -> Result<User, StoreError>;

    async fn save_credential(&self, user_id: Uuid, credential: &Credential)
        -> Result<(), StoreError>;
}
