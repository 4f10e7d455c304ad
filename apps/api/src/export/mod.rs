//! Document Export: publishes finished text to the user's document store.
//!
//! Each requested document is a separate upload with its own outcome. A failed
//! cover letter never hides a resume that made it.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::credentials::{CredentialError, ManagedCredential};

pub mod drive;

pub use drive::DriveDocumentStore;

/// Plain text in; the store decides the final document format.
pub const TEXT_MIME: &str = "text/plain";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Credential rejected: {0}")]
    Credential(#[from] CredentialError),

    #[error("Upload rejected (status {status}): {message}")]
    Upload { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Document store did not return a shareable link")]
    MissingLink,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Uploads one document and returns a shareable URL. Implementations call
    /// `credential.authorize()` before every request.
    async fn upload(
        &self,
        credential: &mut ManagedCredential,
        file_name: &str,
        mime_type: &str,
        content: &str,
    ) -> Result<String, ExportError>;
}

/// One document to publish.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub file_name: String,
    pub content: String,
}

/// `None` means the document was not requested.
#[derive(Debug, Default)]
pub struct ExportOutcome {
    pub resume: Option<Result<String, ExportError>>,
    pub cover_letter: Option<Result<String, ExportError>>,
}

impl ExportOutcome {
    pub fn resume_url(&self) -> Option<&str> {
        self.resume.as_ref().and_then(|r| r.as_ref().ok()).map(String::as_str)
    }

    pub fn cover_letter_url(&self) -> Option<&str> {
        self.cover_letter
            .as_ref()
            .and_then(|r| r.as_ref().ok())
            .map(String::as_str)
    }

    pub fn any_succeeded(&self) -> bool {
        self.resume_url().is_some() || self.cover_letter_url().is_some()
    }
}

/// Uploads the requested documents one after the other, sharing the credential
/// so a refresh happens at most once.
pub async fn export_documents(
    store: &dyn DocumentStore,
    credential: &mut ManagedCredential,
    resume: Option<ExportRequest>,
    cover_letter: Option<ExportRequest>,
) -> ExportOutcome {
    let mut outcome = ExportOutcome::default();

    if let Some(req) = resume {
        outcome.resume = Some(upload_one(store, credential, &req).await);
    }
    if let Some(req) = cover_letter {
        outcome.cover_letter = Some(upload_one(store, credential, &req).await);
    }
    outcome
}

async fn upload_one(
    store: &dyn DocumentStore,
    credential: &mut ManagedCredential,
    req: &ExportRequest,
) -> Result<String, ExportError> {
    let result = store
        .upload(credential, &req.file_name, TEXT_MIME, &req.content)
        .await;
    match &result {
        Ok(url) => info!("Exported '{}' to {url}", req.file_name),
        Err(e) => warn!("Export of '{}' failed: {e}", req.file_name),
    }
    result
}


#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::testing::FakeDocumentStore;
    use super::*;
    use crate::credentials::testing::FixedRefresher;
    use crate::credentials::{Credential, TokenGrant};

    fn valid_credential() -> ManagedCredential {
        ManagedCredential::new(
            Credential {
                access_token: "at".into(),
                refresh_token: Some("rt".into()),
                expiry: Utc::now() + Duration::hours(1),
            },
            FixedRefresher::rejecting(),
        )
    }

    fn request(name: &str) -> Option<ExportRequest> {
        Some(ExportRequest {
            file_name: name.to_string(),
            content: format!("{name} body"),
        })
    }

    #[tokio::test]
    async fn test_cover_letter_failure_keeps_resume_url() {
        let store = FakeDocumentStore::failing_on("coverletter_");
        let mut credential = valid_credential();

        let outcome = export_documents(
            &store,
            &mut credential,
            request("resume_Engineer_Acme"),
            request("coverletter_Engineer_Acme"),
        )
        .await;

        assert_eq!(
            outcome.resume_url(),
            Some("https://docs.example/resume_Engineer_Acme")
        );
        assert!(matches!(
            outcome.cover_letter,
            Some(Err(ExportError::Upload { status: 403, .. }))
        ));
        assert!(outcome.any_succeeded());
    }

    #[tokio::test]
    async fn test_unrequested_documents_are_not_uploaded() {
        let store = FakeDocumentStore::accepting();
        let mut credential = valid_credential();

        let outcome =
            export_documents(&store, &mut credential, None, request("coverletter_x")).await;

        assert!(outcome.resume.is_none());
        assert_eq!(store.uploaded_names(), vec!["coverletter_x"]);
    }

    #[tokio::test]
    async fn test_expired_credential_refreshes_once_for_both_uploads() {
        let refresher = FixedRefresher::granting(TokenGrant {
            access_token: "fresh".into(),
            refresh_token: None,
            expiry: Some((Utc::now() + Duration::hours(1)).into()),
        });
        let mut credential = ManagedCredential::new(
            Credential::materialize("stale", Some("rt".into()), None),
            refresher.clone(),
        );
        let store = FakeDocumentStore::accepting();

        let outcome =
            export_documents(&store, &mut credential, request("resume_a"), request("coverletter_a"))
                .await;

        assert!(outcome.resume_url().is_some());
        assert!(outcome.cover_letter_url().is_some());
        assert_eq!(refresher.call_count(), 1);
        assert!(credential.was_refreshed());
    }

    #[tokio::test]
    async fn test_rejected_refresh_fails_every_field() {
        let mut credential = ManagedCredential::new(
            Credential::materialize("stale", Some("rt".into()), None),
            FixedRefresher::rejecting(),
        );
        let store = FakeDocumentStore::accepting();

        let outcome =
            export_documents(&store, &mut credential, request("resume_a"), request("coverletter_a"))
                .await;

        assert!(matches!(outcome.resume, Some(Err(ExportError::Credential(_)))));
        assert!(matches!(outcome.cover_letter, Some(Err(ExportError::Credential(_)))));
        assert!(!outcome.any_succeeded());
    }
}
