use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkMode {
    Remote,
    Hybrid,
    OnSite,
}

impl WorkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::Remote => "remote",
            WorkMode::Hybrid => "hybrid",
            WorkMode::OnSite => "on-site",
        }
    }
}

/// Caller-supplied search criteria. Only `title` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobQuery {
    pub title: String,
    pub location: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub experience_level: Option<String>,
    pub work_mode: Option<WorkMode>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    #[serde(default)]
    pub include_keywords: Vec<String>,
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
}

impl JobQuery {
    /// City wins over the free-form location; blanks count as missing.
    pub fn place(&self) -> Option<&str> {
        non_blank(self.city.as_deref()).or_else(|| non_blank(self.location.as_deref()))
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A posting normalized from a search provider or the sample set.
/// `match_score` is always `None` here; scoring happens later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub snippet: Option<String>,
    pub url: String,
    pub application_link: Option<String>,
    pub match_score: Option<f64>,
    pub work_mode: Option<String>,
    pub experience_level: Option<String>,
    pub skills: Vec<String>,
    /// Naive UTC.
    pub posting_date: Option<NaiveDateTime>,
    pub company_logo_url: Option<String>,
}

/// A posting as persisted under a search. `id` is ours, not the provider's.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPostingRow {
    pub id: Uuid,
    pub search_id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub snippet: Option<String>,
    pub url: String,
    pub application_link: Option<String>,
    pub match_score: Option<f64>,
    pub work_mode: Option<String>,
    pub experience_level: Option<String>,
    pub skills: Vec<String>,
    pub posting_date: Option<NaiveDateTime>,
    pub company_logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
