//! PostgreSQL implementation of `Store`. Schema: `migrations/0001_init.sql`.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::credentials::google::GoogleProfile;
use crate::credentials::Credential;
use crate::models::job::{JobPosting, JobPostingRow, JobQuery};
use crate::models::resume::ResumeRow;
use crate::models::tailoring::{DocumentField, NewTailoring, TailoringArtifact};
use crate::models::user::User;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn record_search(
        &self,
        user_id: Uuid,
        query: &JobQuery,
        postings: &[JobPosting],
    ) -> Result<Vec<JobPostingRow>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let search_id: Uuid = sqlx::query_scalar(
            "INSERT INTO job_search_history (user_id, query_parameters) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(Json(query))
        .fetch_one(&mut *tx)
        .await?;

        let mut rows = Vec::with_capacity(postings.len());
        for posting in postings {
            let row: JobPostingRow = sqlx::query_as(
                r#"
                INSERT INTO job_postings
                    (search_id, title, company, location, description, snippet, url,
                     application_link, match_score, work_mode, experience_level, skills,
                     posting_date, company_logo_url)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                RETURNING *
                "#,
            )
            .bind(search_id)
            .bind(&posting.title)
            .bind(&posting.company)
            .bind(&posting.location)
            .bind(&posting.description)
            .bind(&posting.snippet)
            .bind(&posting.url)
            .bind(&posting.application_link)
            .bind(posting.match_score)
            .bind(&posting.work_mode)
            .bind(&posting.experience_level)
            .bind(&posting.skills)
            .bind(posting.posting_date)
            .bind(&posting.company_logo_url)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;
        info!("Recorded search {search_id} with {} postings", rows.len());
        Ok(rows)
    }

    async fn get_job(&self, user_id: Uuid, job_id: Uuid) -> Result<JobPostingRow, StoreError> {
        sqlx::query_as(
            r#"
            SELECT p.* FROM job_postings p
            JOIN job_search_history s ON s.id = p.search_id
            WHERE p.id = $1 AND s.user_id = $2
            "#,
        )
        .bind(job_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("Job"))
    }

    async fn set_job_score(&self, job_id: Uuid, score: f64) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE job_postings SET match_score = $1, updated_at = now() WHERE id = $2",
        )
        .bind(score)
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Job"));
        }
        Ok(())
    }

    async fn get_resume(&self, user_id: Uuid, resume_id: Uuid) -> Result<ResumeRow, StoreError> {
        sqlx::query_as("SELECT * FROM resume_files WHERE id = $1 AND user_id = $2")
            .bind(resume_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("Resume"))
    }

    async fn latest_resume(&self, user_id: Uuid) -> Result<Option<ResumeRow>, StoreError> {
        Ok(sqlx::query_as(
            "SELECT * FROM resume_files WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_tailoring(&self, new: NewTailoring) -> Result<TailoringArtifact, StoreError> {
        Ok(sqlx::query_as(
            r#"
            INSERT INTO resume_tailorings
                (user_id, resume_id, job_id, tailored_resume_text,
                 tailored_coverletter_text, match_score)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(new.resume_id)
        .bind(new.job_id)
        .bind(&new.tailored_resume_text)
        .bind(&new.tailored_coverletter_text)
        .bind(new.match_score)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_tailoring(
        &self,
        user_id: Uuid,
        tailoring_id: Uuid,
    ) -> Result<TailoringArtifact, StoreError> {
        sqlx::query_as("SELECT * FROM resume_tailorings WHERE id = $1 AND user_id = $2")
            .bind(tailoring_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("Tailoring"))
    }

    async fn update_tailoring_text(
        &self,
        tailoring_id: Uuid,
        field: DocumentField,
        text: &str,
    ) -> Result<(), StoreError> {
        let sql = match field {
            DocumentField::Resume => {
                "UPDATE resume_tailorings SET tailored_resume_text = $1, updated_at = now() WHERE id = $2"
            }
            DocumentField::CoverLetter => {
                "UPDATE resume_tailorings SET tailored_coverletter_text = $1, updated_at = now() WHERE id = $2"
            }
        };
        let result = sqlx::query(sql)
            .bind(text)
            .bind(tailoring_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Tailoring"));
        }
        Ok(())
    }

    async fn record_export(
        &self,
        tailoring_id: Uuid,
        resume_url: Option<&str>,
        cover_letter_url: Option<&str>,
    ) -> Result<(), StoreError> {
        let exported = resume_url.is_some() || cover_letter_url.is_some();
        let result = sqlx::query(
            r#"
            UPDATE resume_tailorings SET
                drive_resume_url = COALESCE($1, drive_resume_url),
                drive_coverletter_url = COALESCE($2, drive_coverletter_url),
                saved_to_drive = saved_to_drive OR $3,
                updated_at = now()
            WHERE id = $4
            "#,
        )
        .bind(resume_url)
        .bind(cover_letter_url)
        .bind(exported)
        .bind(tailoring_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Tailoring"));
        }
        Ok(())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<User, StoreError> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound("User"))
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

        let user: User = sqlx::query_as(
            r#"
            INSERT INTO users
                (name, email, google_sub, google_access_token, google_refresh_token, google_token_expiry)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO UPDATE SET
                name = COALESCE($7, users.name),
                google_sub = COALESCE(EXCLUDED.google_sub, users.google_sub),
                google_access_token = EXCLUDED.google_access_token,
                google_refresh_token = COALESCE(EXCLUDED.google_refresh_token, users.google_refresh_token),
                google_token_expiry = EXCLUDED.google_token_expiry,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(profile.display_name())
        .bind(email)
        .bind(&profile.id)
        .bind(&credential.access_token)
        .bind(&credential.refresh_token)
        .bind(credential.expiry)
        .bind(&profile.name)
        .fetch_one(&self.pool)
        .await?;

        info!("Upserted Google user {}", user.id);
        Ok(user)
    }

    async fn save_credential(
        &self,
        user_id: Uuid,
        credential: &Credential,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                google_access_token = $1,
                google_refresh_token = COALESCE($2, google_refresh_token),
                google_token_expiry = $3,
                updated_at = now()
            WHERE id = $4
            "#,
        )
        .bind(&credential.access_token)
        .bind(&credential.refresh_token)
        .bind(credential.expiry)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("User"));
        }
        Ok(())
    }
}
