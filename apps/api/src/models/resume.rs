use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An uploaded resume. `parsed_text` is produced upstream by text extraction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_url: String,
    pub parsed_text: String,
    pub original_filename: Option<String>,
    pub created_at: DateTime<Utc>,
}
