//! Axum route handlers for the Google OAuth flow.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuthUrlQuery {
    /// Where the callback should send the browser afterwards.
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthUrlResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: Option<String>,
}

/// GET /api/v1/auth/google/url
pub async fn handle_google_auth_url(
    State(state): State<AppState>,
    Query(params): Query<AuthUrlQuery>,
) -> Result<Json<AuthUrlResponse>, AppError> {
    if let Some(target) = params.redirect.as_deref() {
        allowed_redirect(&state.config.frontend_origins, target)?;
    }
    let url = state.oauth.authorization_url(params.redirect.as_deref())?;
    Ok(Json(AuthUrlResponse { url }))
}

/// GET /api/v1/auth/google/callback
///
/// Exchanges the code, upserts the user by email and either redirects to the
/// `state` URL with `user_id` appended or returns the user. `state` must point
/// at one of the configured frontend origins.
pub async fn handle_google_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    let grant = state.oauth.exchange_code(&params.code).await?;
    let credential = grant.into_credential(None);
    let profile = state.oauth.fetch_profile(&credential.access_token).await?;

    if profile.email.as_deref().map_or(true, |e| e.trim().is_empty()) {
        return Err(AppError::Validation(
            "Unable to fetch Google profile email.".to_string(),
        ));
    }

    let user: User = state.store.upsert_google_user(&profile, &credential).await?;
    info!("Google sign-in completed for user {}", user.id);

    match params.state.as_deref() {
        Some(target) => {
            let mut url = allowed_redirect(&state.config.frontend_origins, target)?;
            url.query_pairs_mut()
                .append_pair("user_id", &user.id.to_string());
            Ok(Redirect::to(url.as_str()).into_response())
        }
        None => Ok(Json(user).into_response()),
    }
}

fn allowed_redirect(origins: &[String], target: &str) -> Result<Url, AppError> {
    let url = Url::parse(target)
        .map_err(|e| AppError::Validation(format!("Invalid redirect state: {e}")))?;
    let origin = url.origin().ascii_serialization();
    if origins.iter().any(|allowed| *allowed == origin) {
        Ok(url)
    } else {
        Err(AppError::Validation(format!(
            "Redirect origin {origin} is not allowed"
        )))
    }
}
