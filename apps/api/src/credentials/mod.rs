//! Credential Lifecycle: OAuth tokens used to export documents.
//!
//! Expiry is carried as `DateTime<Utc>` everywhere inside the service. Values
//! arriving from outside (token endpoints, legacy rows) may be naive or carry an
//! arbitrary offset; they enter through `StoredExpiry` and `normalize_expiry`,
//! which is the only conversion point.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;
use tracing::info;

pub mod google;
pub mod handlers;

/// Refresh this long before the provider would reject the token.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("User missing Google Drive tokens.")]
    MissingTokens,

    #[error("Credential has no refresh token")]
    MissingRefreshToken,

    #[error("Token endpoint rejected the request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("OAuth configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// An expiry as some external party handed it to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredExpiry {
    /// No timezone attached; interpreted as UTC.
    Naive(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

impl From<NaiveDateTime> for StoredExpiry {
    fn from(value: NaiveDateTime) -> Self {
        StoredExpiry::Naive(value)
    }
}

impl From<DateTime<FixedOffset>> for StoredExpiry {
    fn from(value: DateTime<FixedOffset>) -> Self {
        StoredExpiry::Aware(value)
    }
}

impl From<DateTime<Utc>> for StoredExpiry {
    fn from(value: DateTime<Utc>) -> Self {
        StoredExpiry::Aware(value.into())
    }
}

/// Converts any expiry to an absolute UTC instant. Naive values are read as UTC;
/// a missing expiry means "now", so the credential is refreshed on first use.
///
/// Idempotent: `normalize_expiry(Some(normalize_expiry(x).into())) == normalize_expiry(x)`.
pub fn normalize_expiry(expiry: Option<StoredExpiry>) -> DateTime<Utc> {
    match expiry {
        None => Utc::now(),
        Some(StoredExpiry::Naive(naive)) => Utc.from_utc_datetime(&naive),
        Some(StoredExpiry::Aware(aware)) => aware.with_timezone(&Utc),
    }
}

/// Access/refresh token pair with a normalized expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
}

impl Credential {
    pub fn materialize(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expiry: Option<StoredExpiry>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expiry: normalize_expiry(expiry),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry - Duration::seconds(EXPIRY_SKEW_SECS) <= now
    }
}

/// What a token endpoint returns from a code exchange or refresh.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: Option<StoredExpiry>,
}

impl TokenGrant {
    /// `fallback_refresh` is kept when the provider does not rotate the token.
    pub fn into_credential(self, fallback_refresh: Option<String>) -> Credential {
        Credential::materialize(
            self.access_token,
            self.refresh_token.or(fallback_refresh),
            self.expiry,
        )
    }
}

#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, CredentialError>;
}

/// Owns a credential together with the client able to refresh it. Every path
/// that replaces the token goes through `normalize_expiry`, so a refreshed
/// credential can never fall back to a naive expiry.
pub struct ManagedCredential {
    credential: Credential,
    refresher: Arc<dyn TokenRefresher>,
    refreshed: bool,
}

impl ManagedCredential {
    pub fn new(credential: Credential, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            credential,
            refresher,
            refreshed: false,
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// True once the wrapped token has been replaced and should be persisted.
    pub fn was_refreshed(&self) -> bool {
        self.refreshed
    }

    pub async fn refresh(&mut self) -> Result<(), CredentialError> {
        let refresh_token = self
            .credential
            .refresh_token
            .clone()
            .ok_or(CredentialError::MissingRefreshToken)?;

        let grant = self.refresher.refresh(&refresh_token).await?;
        self.credential = grant.into_credential(Some(refresh_token));
        self.refreshed = true;

        info!(
            "OAuth credential refreshed, new expiry {}",
            self.credential.expiry.to_rfc3339()
        );
        Ok(())
    }

    /// Call before every outbound request. Refreshes an expired token and
    /// returns the bearer value to send.
    pub async fn authorize(&mut self) -> Result<String, CredentialError> {
        if self.credential.is_expired_at(Utc::now()) {
            self.refresh().await?;
        }
        Ok(self.credential.access_token.clone())
    }
}
