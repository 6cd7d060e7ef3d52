// handlers/user/profile.rs - GET/PATCH /api/user/profile, GET /api/user/verification

use axum::{extract::State, Extension};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::Filter;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthSubject};
use crate::models::{Patch, Public, User, UserPatch, Verification};
use crate::state::AppState;

pub async fn profile_get(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
) -> ApiResult<Public<User>> {
    let user = state.collection::<User>().find_404(Filter::by_id(subject.id), "User").await?;
    Ok(ApiResponse::success(Public(user)))
}

/// Only `name` and `phone`; anything else is rejected at parse time.
pub async fn profile_patch(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> ApiResult<Public<User>> {
    let changes = patch.into_changes(state.now())?;
    let user = state
        .collection::<User>()
        .update_404(Filter::by_id(subject.id), changes, "User")
        .await?;
    Ok(ApiResponse::success(Public(user)))
}

#[derive(Debug, Serialize)]
pub struct VerificationStatus {
    pub email: String,
    pub verified: bool,
    pub expires_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// State of the caller's most recent verification code.
pub async fn verification_status(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
) -> ApiResult<VerificationStatus> {
    let latest = state
        .collection::<Verification>()
        .find(Filter::all().eq("user_id", subject.id.to_string()))
        .await?
        .pop()
        .ok_or_else(|| ApiError::not_found("No verification found for this user"))?;

    Ok(ApiResponse::success(VerificationStatus {
        email: latest.email,
        verified: latest.verified,
        expires_at: latest.expires_at,
        verified_at: latest.verified_at,
    }))
}
