// handlers/admin/mod.rs - /api/admin/* (role: admin)
//
// Admins own the companies they create and staff them with managers.

pub mod companies;
pub mod staff;

use axum::{extract::State, Extension};

use crate::database::Filter;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthSubject};
use crate::models::{public, Admin, AdminPatch, Patch, Public, User};
use crate::state::AppState;

pub use companies::{company_delete, company_get, company_get_by_name, company_patch, companies_list, companies_post};
pub use staff::{appointments_list, managers_list, managers_post};

async fn current(state: &AppState, subject: &AuthSubject) -> Result<Admin, ApiError> {
    Ok(state
        .collection::<Admin>()
        .find_404(Filter::by_id(subject.id), "Admin")
        .await?)
}

pub async fn me(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
) -> ApiResult<Public<Admin>> {
    Ok(ApiResponse::success(Public(current(&state, &subject).await?)))
}

pub async fn me_patch(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    ApiJson(patch): ApiJson<AdminPatch>,
) -> ApiResult<Public<Admin>> {
    let changes = patch.into_changes(state.now())?;
    let admin = state
        .collection::<Admin>()
        .update_404(Filter::by_id(subject.id), changes, "Admin")
        .await?;
    Ok(ApiResponse::success(Public(admin)))
}

pub async fn users_list(State(state): State<AppState>) -> ApiResult<Vec<Public<User>>> {
    let users = state.collection::<User>().find(Filter::all()).await?;
    Ok(ApiResponse::success(public(users)))
}
