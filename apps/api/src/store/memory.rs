//! In-memory `Store` for unit tests. Same owner scoping as `PgStore`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::credentials::google::GoogleProfile;
use crate::credentials::Credential;
use crate::models::job::{JobPosting, JobPostingRow, JobQuery};
use crate::models::resume::ResumeRow;
use crate::models::tailoring::{DocumentField, NewTailoring, TailoringArtifact};
use crate::models::user::User;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    resumes: Vec<ResumeRow>,
    /// search id -> owner
    searches: HashMap<Uuid, Uuid>,
    jobs: HashMap<Uuid, JobPostingRow>,
    tailorings: HashMap<Uuid, TailoringArtifact>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_record_export: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, email: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "Test User".into(),
            email: email.into(),
            google_sub: None,
            google_access_token: None,
            google_refresh_token: None,
            google_token_expiry: None,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .unwrap()
            .users
            .insert(user.id, user.clone());
        user
    }

    /// Makes every later `record_export` fail as a dropped connection would.
    pub fn fail_record_export(&self) {
        self.fail_record_export.store(true, Ordering::SeqCst);
    }

    pub fn add_resume(&self, user_id: Uuid, parsed_text: &str) -> ResumeRow {
        let resume = ResumeRow {
            id: Uuid::new_v4(),
            user_id,
            file_url: "uploads/resume.pdf".into(),
            parsed_text: parsed_text.into(),
            original_filename: Some("resume.pdf".into()),
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().resumes.push(resume.clone());
        resume
    }

    pub fn tailoring_count(&self) -> usize {
        self.tables.lock().unwrap().tailorings.len()
    }

    pub fn user(&self, user_id: Uuid) -> Option<User> {
        self.tables.lock().unwrap().users.get(&user_id).cloned()
    }

    pub fn job(&self, job_id: Uuid) -> Option<JobPostingRow> {
        self.tables.lock().unwrap().jobs.get(&job_id).cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn record_search(
        &self,
        user_id: Uuid,
        _query: &JobQuery,
        postings: &[JobPosting],
    ) -> Result<Vec<JobPostingRow>, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let search_id = Uuid::new_v4();
        tables.searches.insert(search_id, user_id);

        let now = Utc::now();
        let rows: Vec<JobPostingRow> = postings
            .iter()
            .map(|p| JobPostingRow {
                id: Uuid::new_v4(),
                search_id,
                title: p.title.clone(),
                company: p.company.clone(),
                location: p.location.clone(),
                description: p.description.clone(),
                snippet: p.snippet.clone(),
                url: p.url.clone(),
                application_link: p.application_link.clone(),
                match_score: p.match_score,
                work_mode: p.work_mode.clone(),
                experience_level: p.experience_level.clone(),
                skills: p.skills.clone(),
                posting_date: p.posting_date,
                company_logo_url: p.company_logo_url.clone(),
                created_at: now,
                updated_at: now,
            })
            .collect();
        for row in &rows {
            tables.jobs.insert(row.id, row.clone());
        }
        Ok(rows)
    }

    async fn get_job(&self, user_id: Uuid, job_id: Uuid) -> Result<JobPostingRow, StoreError> {
        let tables = self.tables.lock().unwrap();
        tables
            .jobs
            .get(&job_id)
            .filter(|job| tables.searches.get(&job.search_id) == Some(&user_id))
            .cloned()
            .ok_or(StoreError::NotFound("Job"))
    }

    async fn set_job_score(&self, job_id: Uuid, score: f64) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let job = tables.jobs.get_mut(&job_id).ok_or(StoreError::NotFound("Job"))?;
        job.match_score = Some(score);
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn get_resume(&self, user_id: Uuid, resume_id: Uuid) -> Result<ResumeRow, StoreError> {
        self.tables
            .lock()
            .unwrap()
            .resumes
            .iter()
            .find(|r| r.id == resume_id && r.user_id == user_id)
            .cloned()
            .ok_or(StoreError::NotFound("Resume"))
    }

    async fn latest_resume(&self, user_id: Uuid) -> Result<Option<ResumeRow>, StoreError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .resumes
            .iter()
            .filter(|r| r.user_id == user_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn insert_tailoring(&self, new: NewTailoring) -> Result<TailoringArtifact, StoreError> {
        let now = Utc::now();
        let artifact = TailoringArtifact {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            resume_id: new.resume_id,
            job_id: new.job_id,
            tailored_resume_text: new.tailored_resume_text,
            tailored_coverletter_text: new.tailored_coverletter_text,
            match_score: new.match_score,
            saved_to_drive: false,
            drive_resume_url: None,
            drive_coverletter_url: None,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .unwrap()
            .tailorings
            .insert(artifact.id, artifact.clone());
        Ok(artifact)
    }

    async fn get_tailoring(
        &self,
        user_id: Uuid,
        tailoring_id: Uuid,
    ) -> Result<TailoringArtifact, StoreError> {
        self.tables
            .lock()
            .unwrap()
            .tailorings
            .get(&tailoring_id)
            .filter(|t| t.user_id == user_id)
            .cloned()
            .ok_or(StoreError::NotFound("Tailoring"))
    }

    async fn update_tailoring_text(
        &self,
        tailoring_id: Uuid,
        field: DocumentField,
        text: &str,
    ) -> Result<(), StoreError> {
        if self.fail_record_export.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        let mut tables = self.tables.lock().unwrap();
        let artifact = tables
            .tailorings
            .get_mut(&tailoring_id)
            .ok_or(StoreError::NotFound("Tailoring"))?;
        match field {
            DocumentField::Resume => artifact.tailored_resume_text = text.to_string(),
            DocumentField::CoverLetter => artifact.tailored_coverletter_text = text.to_string(),
        }
        artifact.updated_at = Utc::now();
        Ok(())
    }

    async fn record_export(
        &self,
        tailoring_id: Uuid,
        resume_url: Option<&str>,
        cover_letter_url: Option<&str>,
    ) -> Result<(), StoreError> {
        if self.fail_record_export.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }
        let mut tables = self.tables.lock().unwrap();
        let artifact = tables
            .tailorings
            .get_mut(&tailoring_id)
            .ok_or(StoreError::NotFound("Tailoring"))?;
        if let Some(url) = resume_url {
            artifact.drive_resume_url = Some(url.to_string());
        }
        if let Some(url) = cover_letter_url {
            artifact.drive_coverletter_url = Some(url.to_string());
        }
        artifact.saved_to_drive |= resume_url.is_some() || cover_letter_url.is_some();
        artifact.updated_at = Utc::now();
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<User, StoreError> {
        self.user(user_id).ok_or(StoreError::NotFound("User"))
    }

    async fn upsert_google_user(
        &self,
        profile: &GoogleProfile,
        credential: &Credential,
    ) -> Result<User, StoreError> {
        let email = profile
            .email
            .as_deref()
            .ok_or(StoreError::NotFound("Profile email"))?;
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();

        let existing = tables.users.values_mut().find(|u| u.email == email);
        let user = match existing {
            Some(user) => {
                if let Some(name) = &profile.name {
                    user.name = name.clone();
                }
                if profile.id.is_some() {
                    user.google_sub = profile.id.clone();
                }
                user.google_access_token = Some(credential.access_token.clone());
                if credential.refresh_token.is_some() {
                    user.google_refresh_token = credential.refresh_token.clone();
                }
                user.google_token_expiry = Some(credential.expiry);
                user.updated_at = now;
                user.clone()
            }
            None => {
                let user = User {
                    id: Uuid::new_v4(),
                    name: profile.display_name().to_string(),
                    email: email.to_string(),
                    google_sub: profile.id.clone(),
                    google_access_token: Some(credential.access_token.clone()),
                    google_refresh_token: credential.refresh_token.clone(),
                    google_token_expiry: Some(credential.expiry),
                    created_at: now,
                    updated_at: now,
                };
                tables.users.insert(user.id, user.clone());
                user
            }
        };
        Ok(user)
    }

    async fn save_credential(
        &self,
        user_id: Uuid,
        credential: &Credential,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let user = tables
            .users
            .get_mut(&user_id)
            .ok_or(StoreError::NotFound("User"))?;
        user.google_access_token = Some(credential.access_token.clone());
        if credential.refresh_token.is_some() {
            user.google_refresh_token = credential.refresh_token.clone();
        }
        user.google_token_expiry = Some(credential.expiry);
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sourcing::fallback::sample_postings;

    fn profile(email: &str, name: Option<&str>) -> GoogleProfile {
        GoogleProfile {
            id: Some("sub-1".into()),
            email: Some(email.into()),
            name: name.map(str::to_string),
            given_name: None,
        }
    }

    #[tokio::test]
    async fn test_jobs_are_scoped_to_the_searching_user() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let query = JobQuery {
            title: "Engineer".into(),
            ..Default::default()
        };
        let rows = store
            .record_search(owner, &query, &sample_postings(&query))
            .await
            .unwrap();

        assert!(store.get_job(owner, rows[0].id).await.is_ok());
        let err = store.get_job(Uuid::new_v4(), rows[0].id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound("Job")));
    }

    #[tokio::test]
    async fn test_upsert_keeps_refresh_token_when_grant_has_none() {
        let store = MemoryStore::new();
        let first = Credential::materialize("at-1", Some("rt-1".into()), None);
        let created = store
            .upsert_google_user(&profile("a@b.c", Some("Ada")), &first)
            .await
            .unwrap();

        let second = Credential::materialize("at-2", None, None);
        let updated = store
            .upsert_google_user(&profile("a@b.c", None), &second)
            .await
            .unwrap();

        assert_eq!(created.id, updated.id);
        assert_eq!(updated.name, "Ada");
        assert_eq!(updated.google_access_token.as_deref(), Some("at-2"));
        assert_eq!(updated.google_refresh_token.as_deref(), Some("rt-1"));
    }

    #[tokio::test]
    async fn test_record_export_only_overwrites_given_urls() {
        let store = MemoryStore::new();
        let artifact = store
            .insert_tailoring(NewTailoring {
                user_id: Uuid::new_v4(),
                resume_id: Uuid::new_v4(),
                job_id: Uuid::new_v4(),
                tailored_resume_text: "r".into(),
                tailored_coverletter_text: "c".into(),
                match_score: 70.0,
            })
            .await
            .unwrap();

        store
            .record_export(artifact.id, Some("https://r1"), Some("https://c1"))
            .await
            .unwrap();
        store
            .record_export(artifact.id, Some("https://r2"), None)
            .await
            .unwrap();

        let saved = store
            .get_tailoring(artifact.user_id, artifact.id)
            .await
            .unwrap();
        assert!(saved.saved_to_drive);
        assert_eq!(saved.drive_resume_url.as_deref(), Some("https://r2"));
        assert_eq!(saved.drive_coverletter_url.as_deref(), Some("https://c1"));
    }
}
