//! Google OAuth 2.0 client: consent URL, code exchange, refresh and profile lookup.

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{CredentialError, StoredExpiry, TokenGrant, TokenRefresher};
use crate::config::Config;

const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URI: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    /// Google reports a lifetime in seconds; like most OAuth libraries we turn
    /// that into a naive UTC timestamp, which `normalize_expiry` then anchors.
    fn into_grant(self, issued_at: NaiveDateTime) -> TokenGrant {
        TokenGrant {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expiry: self
                .expires_in
                .map(|secs| StoredExpiry::Naive(issued_at + Duration::seconds(secs))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub given_name: Option<String>,
}

impl GoogleProfile {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.given_name.as_deref())
            .unwrap_or("User")
    }
}

#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    scopes: Vec<String>,
    token_uri: String,
    userinfo_uri: String,
}

impl GoogleOAuthClient {
    pub fn from_config(config: &Config) -> Result<Self, CredentialError> {
        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()?,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.google_redirect_uri.clone(),
            scopes: config.google_scopes.clone(),
            token_uri: TOKEN_URI.to_string(),
            userinfo_uri: USERINFO_URI.to_string(),
        })
    }

    /// Consent screen URL. Offline access with forced consent so Google always
    /// hands back a refresh token.
    pub fn authorization_url(&self, state: Option<&str>) -> Result<String, CredentialError> {
        let scope = self.scopes.join(" ");
        let mut params: Vec<(&str, &str)> = vec![
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("include_granted_scopes", "true"),
        ];
        if let Some(state) = state {
            params.push(("state", state));
        }

        Url::parse_with_params(AUTH_URI, &params)
            .map(String::from)
            .map_err(|e| CredentialError::Config(e.to_string()))
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, CredentialError> {
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        self.post_token(&form).await
    }

    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, CredentialError> {
        let response = self
            .http
            .get(&self.userinfo_uri)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.json().await?)
    }

    async fn post_token(&self, form: &[(&str, &str)]) -> Result<TokenGrant, CredentialError> {
        let response = self.http.post(&self.token_uri).form(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.into_grant(Utc::now().naive_utc()))
    }
}

#[async_trait]
impl TokenRefresher for GoogleOAuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, CredentialError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        self.post_token(&form).await
    }
}
