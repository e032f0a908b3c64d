use axum::extract::State;
use axum::response::Response;
use axum::Json;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::error::ApiError;
use crate::tokens::IssuedToken;

#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub expires_at: String,
}

impl From<IssuedToken> for TokenResponse {
    fn from(value: IssuedToken) -> Self {
        Self {
            token: value.token,
            token_type: value.token_type,
            expires_in: value.expires_in,
            expires_at: value
                .expires_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

fn validate_credentials(request: &CredentialRequest) -> Result<(), ApiError> {
    let email = request.email.trim();
    if email.is_empty() {
        return Err(ApiError::validation("email: must not be blank"));
    }
    if !email.contains('@') {
        return Err(ApiError::validation(
            "email: must be a well-formed email address",
        ));
    }
    if request.password.is_empty() {
        return Err(ApiError::validation("password: must not be blank"));
    }
    Ok(())
}

pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<CredentialRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    validate_credentials(&request)?;
    let issued = state
        .flow
        .register(request.email.trim(), &request.password)
        .await?;
    Ok(Json(issued.into()))
}

pub async fn login_user(
    State(state): State<AppState>,
    Json(request): Json<CredentialRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    validate_credentials(&request)?;
    let issued = state
        .flow
        .login(request.email.trim(), &request.password)
        .await?;
    Ok(Json(issued.into()))
}

pub async fn render_metrics(State(state): State<AppState>) -> Result<Response, ApiError> {
    state
        .metrics
        .render()
        .map_err(|err| ApiError::internal(format!("Failed to render metrics: {err}")))
}

pub async fn health() -> &'static str {
    "ok"
}
