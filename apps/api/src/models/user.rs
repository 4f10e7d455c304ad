use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub google_sub: Option<String>,
    #[serde(skip_serializing)]
    pub google_access_token: Option<String>,
    #[serde(skip_serializing)]
    pub google_refresh_token: Option<String>,
    pub google_token_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
