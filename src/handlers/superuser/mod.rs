// handlers/superuser/mod.rs - /api/superuser/* (role: superuser)
//
// Admin provisioning and account administration across all users.

use axum::{
    extract::{Path, State},
    Extension,
};
use uuid::Uuid;

use crate::database::Filter;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthSubject};
use crate::models::{normalize_email, public, Admin, AdminPatch, NewAdmin, Patch, Public, User, UserAccountPatch, ValidationError};
use crate::state::AppState;

fn email_filter(raw: &str) -> Result<Filter, ApiError> {
    let email = normalize_email(raw).ok_or_else(|| ValidationError::field("email", "A valid email address is required"))?;
    Ok(Filter::all().eq("email", email))
}

pub async fn admins_list(State(state): State<AppState>) -> ApiResult<Vec<Public<Admin>>> {
    let admins = state.collection::<Admin>().find(Filter::all()).await?;
    Ok(ApiResponse::success(public(admins)))
}

/// Promote an existing user to admin. The user must exist and not already
/// be an admin.
pub async fn admins_post(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    ApiJson(request): ApiJson<NewAdmin>,
) -> ApiResult<Public<Admin>> {
    let email = request.validate()?;
    let user = state
        .collection::<User>()
        .find_404(Filter::all().eq("email", email.as_str()), "User")
        .await?;

    let admins = state.collection::<Admin>();
    if admins.find_one(Filter::all().eq("email", email.as_str())).await?.is_some() {
        return Err(ApiError::conflict("User is already an admin"));
    }

    let password_hash = state.hasher.hash(&request.password)?;
    let admin = request.into_admin(&user, password_hash, state.now());
    admins.insert(&admin).await?;

    tracing::info!("Superuser {} promoted user {} to admin {}", subject.id, user.id, admin.id);
    Ok(ApiResponse::created(Public(admin)))
}

pub async fn admin_get_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Public<Admin>> {
    let admin = state.collection::<Admin>().find_404(email_filter(&email)?, "Admin").await?;
    Ok(ApiResponse::success(Public(admin)))
}

pub async fn admin_patch_by_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
    ApiJson(patch): ApiJson<AdminPatch>,
) -> ApiResult<Public<Admin>> {
    let changes = patch.into_changes(state.now())?;
    let admin = state
        .collection::<Admin>()
        .update_404(email_filter(&email)?, changes, "Admin")
        .await?;
    Ok(ApiResponse::success(Public(admin)))
}

pub async fn users_list(State(state): State<AppState>) -> ApiResult<Vec<Public<User>>> {
    let users = state.collection::<User>().find(Filter::all()).await?;
    Ok(ApiResponse::success(public(users)))
}

pub async fn user_patch(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    Path(id): Path<Uuid>,
    ApiJson(patch): ApiJson<UserAccountPatch>,
) -> ApiResult<Public<User>> {
    let changes = patch.into_changes(state.now())?;
    let user = state
        .collection::<User>()
        .update_404(Filter::by_id(id), changes, "User")
        .await?;
    tracing::info!("Superuser {} updated user {}", subject.id, id);
    Ok(ApiResponse::success(Public(user)))
}
