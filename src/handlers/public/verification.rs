// handlers/public/verification.rs - POST /verification/send, POST /verification/verify

use axum::extract::State;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::Filter;
use crate::error::ApiError;
use crate::mail::MailMessage;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::models::{normalize_email, User, ValidationError, Verification};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub user_id: Uuid,
    pub verified: bool,
}

/// Six decimal digits, zero padded.
pub fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

async fn user_by_email(state: &AppState, raw: &str) -> Result<User, ApiError> {
    let email = normalize_email(raw).ok_or_else(|| ValidationError::field("email", "A valid email address is required"))?;
    Ok(state
        .collection::<User>()
        .find_404(Filter::all().eq("email", email.as_str()), "User")
        .await?)
}

/// Create a fresh code for the user and mail it. The code is stored only as
/// a digest.
pub async fn verification_send(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SendRequest>,
) -> ApiResult<SendResponse> {
    let user = user_by_email(&state, &request.email).await?;
    let ttl_minutes = state.config.verification.code_ttl_minutes;

    let code = generate_code();
    let verification = Verification::new(user.id, user.email.clone(), &code, state.now(), Duration::minutes(ttl_minutes));
    state.collection::<Verification>().insert(&verification).await?;

    let message = MailMessage::verification_code(&state.config.mail.sender, &user.email, &code, ttl_minutes);
    state.mailer.send(message).await?;

    tracing::info!("Verification code sent to user {}", user.id);
    Ok(ApiResponse::success(SendResponse {
        user_id: user.id,
        expires_at: verification.expires_at,
    }))
}

/// Check the most recent pending code and mark the user's email verified.
pub async fn verification_verify(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<VerifyRequest>,
) -> ApiResult<VerifyResponse> {
    let user = user_by_email(&state, &request.email).await?;
    let now = state.now();
    let verifications = state.collection::<Verification>();

    let pending = verifications
        .find(Filter::all().eq("user_id", user.id.to_string()).eq("verified", false))
        .await?
        .pop()
        .ok_or_else(|| ApiError::not_found("No pending verification for this user"))?;

    if pending.is_expired(now) {
        return Err(ValidationError::field("code", "Verification code has expired").into());
    }
    if !pending.matches(&request.code) {
        tracing::warn!("Wrong verification code for user {}", user.id);
        return Err(ValidationError::field("code", "Invalid verification code").into());
    }

    let mut changes = Map::new();
    changes.insert("verified".into(), Value::Bool(true));
    changes.insert("verified_at".into(), Value::String(now.to_rfc3339()));
    verifications.update_404(Filter::by_id(pending.id), changes, "Verification").await?;

    let mut user_changes = Map::new();
    user_changes.insert("email_verified".into(), Value::Bool(true));
    user_changes.insert("updated_at".into(), Value::String(now.to_rfc3339()));
    state.collection::<User>().update_404(Filter::by_id(user.id), user_changes, "User").await?;

    tracing::info!("Email verified for user {}", user.id);
    Ok(ApiResponse::success(VerifyResponse {
        user_id: user.id,
        verified: true,
    }))
}
