//! Tailoring: create, edit and export a resume/cover-letter pair for one job.
//!
//! Lifecycle per artifact: created once (score, resume, cover letter), then any
//! number of field-level edits, then zero or more exports.
//!
//! Create is all-or-nothing: the artifact is inserted only after every gateway
//! call has succeeded.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::credentials::{Credential, CredentialError, ManagedCredential, TokenRefresher};
use crate::errors::AppError;
use crate::export::{export_documents, DocumentStore, ExportError, ExportRequest};
use crate::generation::fit_scoring::score_match;
use crate::generation::tailor::{adapt_text, generate_cover_letter, generate_tailored_resume};
use crate::llm_client::LlmClient;
use crate::models::job::JobPostingRow;
use crate::models::resume::ResumeRow;
use crate::models::tailoring::{DocumentField, EditAction, NewTailoring, TailoringArtifact};
use crate::store::Store;

pub mod handlers;

/// The explicit resume when given, else the owner's most recent upload.
pub async fn resolve_resume(
    store: &dyn Store,
    user_id: Uuid,
    resume_id: Option<Uuid>,
) -> Result<ResumeRow, AppError> {
    match resume_id {
        Some(id) => Ok(store.get_resume(user_id, id).await?),
        None => store
            .latest_resume(user_id)
            .await?
            .ok_or_else(|| AppError::Validation("Please upload a resume first.".to_string())),
    }
}

pub async fn create_tailoring(
    llm: &LlmClient,
    store: &dyn Store,
    user_id: Uuid,
    resume: &ResumeRow,
    job: &JobPostingRow,
    instructions: Option<&str>,
) -> Result<TailoringArtifact, AppError> {
    let instructions = instructions.map(str::trim).filter(|s| !s.is_empty());

    let match_score = score_match(llm, &resume.parsed_text, &job.description).await?;
    let tailored_resume = generate_tailored_resume(
        llm,
        &resume.parsed_text,
        &job.description,
        Some(match_score),
        instructions,
    )
    .await?;
    let cover_letter = generate_cover_letter(
        llm,
        &resume.parsed_text,
        &job.description,
        &job.company,
        instructions,
    )
    .await?;

    let artifact = store
        .insert_tailoring(NewTailoring {
            user_id,
            resume_id: resume.id,
            job_id: job.id,
            tailored_resume_text: tailored_resume,
            tailored_coverletter_text: cover_letter,
            match_score,
        })
        .await?;

    info!(
        "Tailoring {} created for job {} (score {:.1})",
        artifact.id, job.id, match_score
    );
    Ok(artifact)
}

/// Rewrites one field of an artifact and returns the new text. The edit base
/// is `user_edits` when given, otherwise the stored text.
pub async fn apply_edit(
    llm: &LlmClient,
    store: &dyn Store,
    user_id: Uuid,
    tailoring_id: Uuid,
    action: &EditAction,
    field: DocumentField,
    user_edits: Option<&str>,
) -> Result<String, AppError> {
    let artifact = store.get_tailoring(user_id, tailoring_id).await?;
    let job = store.get_job(user_id, artifact.job_id).await?;

    let base = match user_edits {
        Some(edits) if !edits.trim().is_empty() => edits,
        _ => artifact.text(field),
    };

    let updated = adapt_text(llm, action, base, Some(&job.description)).await?;
    store
        .update_tailoring_text(artifact.id, field, &updated)
        .await?;

    info!(
        "Tailoring {} {} updated via {:?}",
        artifact.id,
        field.as_str(),
        action
    );
    Ok(updated)
}

/// Per-field result of an export. A field that was not requested has neither
/// a URL nor an error.
#[derive(Debug, Default, Serialize)]
pub struct ExportSummary {
    pub resume_url: Option<String>,
    pub cover_letter_url: Option<String>,
    pub resume_error: Option<String>,
    pub cover_letter_error: Option<String>,
}

impl ExportSummary {
    pub fn all_failed(&self) -> bool {
        self.resume_url.is_none()
            && self.cover_letter_url.is_none()
            && (self.resume_error.is_some() || self.cover_letter_error.is_some())
    }
}

pub fn export_file_name(prefix: &str, job: &JobPostingRow) -> String {
    format!("{prefix}_{}_{}", job.title, job.company)
}

pub async fn export_artifact(
    store: &dyn Store,
    documents: &dyn DocumentStore,
    refresher: Arc<dyn TokenRefresher>,
    user_id: Uuid,
    tailoring_id: Uuid,
    save_resume: bool,
    save_cover_letter: bool,
) -> Result<ExportSummary, AppError> {
    let artifact = store.get_tailoring(user_id, tailoring_id).await?;
    let job = store.get_job(user_id, artifact.job_id).await?;
    let user = store.get_user(user_id).await?;

    let (Some(access_token), Some(refresh_token)) =
        (user.google_access_token.clone(), user.google_refresh_token.clone())
    else {
        return Err(CredentialError::MissingTokens.into());
    };

    let credential = Credential::materialize(
        access_token,
        Some(refresh_token),
        user.google_token_expiry.map(Into::into),
    );
    let mut managed = ManagedCredential::new(credential, refresher);

    let resume = save_resume.then(|| ExportRequest {
        file_name: export_file_name("resume", &job),
        content: artifact.tailored_resume_text.clone(),
    });
    let cover_letter = save_cover_letter.then(|| ExportRequest {
        file_name: export_file_name("coverletter", &job),
        content: artifact.tailored_coverletter_text.clone(),
    });

    let outcome = export_documents(documents, &mut managed, resume, cover_letter).await;

    // The refreshed token is only held here; persist it before anything else can fail.
    if managed.was_refreshed() {
        store.save_credential(user.id, managed.credential()).await?;
    }
    if outcome.any_succeeded() {
        store
            .record_export(
                artifact.id,
                outcome.resume_url(),
                outcome.cover_letter_url(),
            )
            .await?;
    }

    let error_text = |r: &Option<Result<String, ExportError>>| {
        r.as_ref()
            .and_then(|r| r.as_ref().err())
            .map(ToString::to_string)
    };
    let summary = ExportSummary {
        resume_url: outcome.resume_url().map(str::to_string),
        cover_letter_url: outcome.cover_letter_url().map(str::to_string),
        resume_error: error_text(&outcome.resume),
        cover_letter_error: error_text(&outcome.cover_letter),
    };
    if summary.all_failed() {
        warn!("Every requested export of tailoring {} failed", artifact.id);
    }
    Ok(summary)
}
