// handlers/public/login.rs - POST /auth/:role/login handlers
//
// One endpoint per role. Each looks the account up in that role's collection
// and signs the claim with that role's secret.

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{AuthError, Role};
use crate::database::Filter;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::models::{normalize_email, Account, Admin, Manager, Provider, User};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub id: Uuid,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

/// Find the account by email and check the password. Unknown email and
/// wrong password are indistinguishable to the caller.
async fn authenticate<T: Account>(state: &AppState, request: &LoginRequest) -> Result<T, ApiError> {
    let email = normalize_email(&request.email).ok_or(AuthError::InvalidCredentials)?;
    let account = state
        .collection::<T>()
        .find_one(Filter::all().eq("email", email.as_str()))
        .await?;

    let Some(account) = account else {
        tracing::warn!("Login failed for {} in {}: no such account", email, T::COLLECTION);
        return Err(AuthError::InvalidCredentials.into());
    };

    if !state.hasher.verify(&request.password, account.password_hash())? {
        tracing::warn!("Login failed for {} in {}: bad password", email, T::COLLECTION);
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(account)
}

fn issue(state: &AppState, id: Uuid, role: Role) -> ApiResult<LoginResponse> {
    let issued = state.tokens.issue(&id.to_string(), role)?;
    tracing::info!("Issued {} token for {}", role, id);
    Ok(ApiResponse::success(LoginResponse {
        token: issued.token,
        id,
        role,
        expires_at: issued.expires_at,
    }))
}

async fn login_as<T: Account>(state: AppState, request: LoginRequest, role: Role) -> ApiResult<LoginResponse> {
    let account = authenticate::<T>(&state, &request).await?;
    issue(&state, account.id(), role)
}

pub async fn user_login(State(state): State<AppState>, ApiJson(request): ApiJson<LoginRequest>) -> ApiResult<LoginResponse> {
    login_as::<User>(state, request, Role::User).await
}

pub async fn provider_login(State(state): State<AppState>, ApiJson(request): ApiJson<LoginRequest>) -> ApiResult<LoginResponse> {
    login_as::<Provider>(state, request, Role::Provider).await
}

pub async fn manager_login(State(state): State<AppState>, ApiJson(request): ApiJson<LoginRequest>) -> ApiResult<LoginResponse> {
    login_as::<Manager>(state, request, Role::Manager).await
}

pub async fn admin_login(State(state): State<AppState>, ApiJson(request): ApiJson<LoginRequest>) -> ApiResult<LoginResponse> {
    login_as::<Admin>(state, request, Role::Admin).await
}

/// Superusers are regular users with the `super_user` flag; valid credentials
/// without the flag get 403 rather than 401.
pub async fn superuser_login(State(state): State<AppState>, ApiJson(request): ApiJson<LoginRequest>) -> ApiResult<LoginResponse> {
    let user = authenticate::<User>(&state, &request).await?;
    if !user.super_user {
        tracing::warn!("Superuser login refused for {}: flag not set", user.email);
        return Err(ApiError::forbidden("Account does not have superuser access"));
    }
    issue(&state, user.id, Role::Superuser)
}
