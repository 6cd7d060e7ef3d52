// handlers/admin/companies.rs - company CRUD scoped to the calling admin

use axum::{
    extract::{Path, State},
    Extension,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::Filter;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthSubject};
use crate::models::{Company, CompanyPatch, NewCompany, Patch};
use crate::state::AppState;

fn owned(subject: &AuthSubject) -> Filter {
    Filter::all().eq("admin_id", subject.id.to_string())
}

fn owned_by_id(subject: &AuthSubject, id: Uuid) -> Filter {
    owned(subject).eq("id", id.to_string())
}

pub async fn companies_list(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
) -> ApiResult<Vec<Company>> {
    let companies = state.collection::<Company>().find(owned(&subject)).await?;
    Ok(ApiResponse::success(companies))
}

/// Company names are unique.
pub async fn companies_post(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    ApiJson(request): ApiJson<NewCompany>,
) -> ApiResult<Company> {
    request.validate()?;
    let companies = state.collection::<Company>();

    let name = request.name.trim().to_string();
    if companies.find_one(Filter::all().eq("name", name.as_str())).await?.is_some() {
        return Err(ApiError::conflict(format!("Company '{}' already exists", name)));
    }

    let company = request.into_company(subject.id, state.now());
    companies.insert(&company).await?;

    tracing::info!("Admin {} created company {} ({})", subject.id, company.id, company.name);
    Ok(ApiResponse::created(company))
}

pub async fn company_get(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    Path(id): Path<Uuid>,
) -> ApiResult<Company> {
    let company = state.collection::<Company>().find_404(owned_by_id(&subject, id), "Company").await?;
    Ok(ApiResponse::success(company))
}

pub async fn company_get_by_name(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    Path(name): Path<String>,
) -> ApiResult<Company> {
    let company = state
        .collection::<Company>()
        .find_404(owned(&subject).eq("name", name.trim()), "Company")
        .await?;
    Ok(ApiResponse::success(company))
}

pub async fn company_patch(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    Path(id): Path<Uuid>,
    ApiJson(patch): ApiJson<CompanyPatch>,
) -> ApiResult<Company> {
    let changes = patch.into_changes(state.now())?;
    let company = state
        .collection::<Company>()
        .update_404(owned_by_id(&subject, id), changes, "Company")
        .await?;
    Ok(ApiResponse::success(company))
}

/// Removes the company document only; its managers, providers and slots stay.
pub async fn company_delete(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    if !state.collection::<Company>().delete(owned_by_id(&subject, id)).await? {
        return Err(ApiError::not_found("Company not found"));
    }
    tracing::info!("Admin {} deleted company {}", subject.id, id);
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}
