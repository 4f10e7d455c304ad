use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Generated resume + cover letter for one (resume, job) pairing.
///
/// The two text fields are edited independently. Export URLs are overwritten
/// by each later export of the same field.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TailoringArtifact {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub tailored_resume_text: String,
    pub tailored_coverletter_text: String,
    pub match_score: f64,
    pub saved_to_drive: bool,
    pub drive_resume_url: Option<String>,
    pub drive_coverletter_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TailoringArtifact {
    pub fn text(&self, field: DocumentField) -> &str {
        match field {
            DocumentField::Resume => &self.tailored_resume_text,
            DocumentField::CoverLetter => &self.tailored_coverletter_text,
        }
    }
}

/// Everything needed to insert a finished artifact. Only built once both
/// generation calls have succeeded.
#[derive(Debug, Clone)]
pub struct NewTailoring {
    pub user_id: Uuid,
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub tailored_resume_text: String,
    pub tailored_coverletter_text: String,
    pub match_score: f64,
}

/// Which document of an artifact an edit or export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentField {
    Resume,
    CoverLetter,
}

impl DocumentField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentField::Resume => "resume",
            DocumentField::CoverLetter => "cover_letter",
        }
    }
}

/// Named edit applied to an existing tailored document.
///
/// Unrecognised names deserialize to `Other` and get a generic readability pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum EditAction {
    Regenerate,
    Improve,
    Shorten,
    Professional,
    MatchJd,
    Other,
}

impl From<String> for EditAction {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "regenerate" => EditAction::Regenerate,
            "improve" => EditAction::Improve,
            "shorten" => EditAction::Shorten,
            "professional" => EditAction::Professional,
            "match_jd" => EditAction::MatchJd,
            _ => EditAction::Other,
        }
    }
}
