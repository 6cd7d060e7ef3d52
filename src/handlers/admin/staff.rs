// handlers/admin/staff.rs - managers and appointments across the admin's companies

use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::Filter;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthSubject};
use crate::models::{public, AppointmentSlot, Company, Document, Manager, NewManager, Public};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompanyScope {
    #[serde(default)]
    pub company_id: Option<Uuid>,
}

/// Ids of the companies in scope: the one asked for (if the admin owns it)
/// or all of the admin's companies.
async fn scoped_companies(state: &AppState, subject: &AuthSubject, scope: &CompanyScope) -> Result<Vec<Uuid>, ApiError> {
    let mut filter = Filter::all().eq("admin_id", subject.id.to_string());
    if let Some(id) = scope.company_id {
        filter = filter.eq("id", id.to_string());
    }
    let companies = state.collection::<Company>().find(filter).await?;
    if scope.company_id.is_some() && companies.is_empty() {
        return Err(ApiError::not_found("Company not found"));
    }
    Ok(companies.into_iter().map(|c| c.id).collect())
}

async fn find_in_companies<T: Document>(state: &AppState, companies: &[Uuid], extra: Filter) -> Result<Vec<T>, ApiError> {
    let collection = state.collection::<T>();
    let lookups = companies
        .iter()
        .map(|company_id| collection.find(extra.clone().eq("company_id", company_id.to_string())));
    let found = futures::future::try_join_all(lookups).await?;
    Ok(found.into_iter().flatten().collect())
}

pub async fn managers_list(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    Query(scope): Query<CompanyScope>,
) -> ApiResult<Vec<Public<Manager>>> {
    let companies = scoped_companies(&state, &subject, &scope).await?;
    let managers = find_in_companies::<Manager>(&state, &companies, Filter::all()).await?;
    Ok(ApiResponse::success(public(managers)))
}

/// Create a manager for one of the admin's companies.
pub async fn managers_post(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    ApiJson(request): ApiJson<NewManager>,
) -> ApiResult<Public<Manager>> {
    let email = request.validate()?;
    state
        .collection::<Company>()
        .find_404(
            Filter::by_id(request.company_id).eq("admin_id", subject.id.to_string()),
            "Company",
        )
        .await?;

    let managers = state.collection::<Manager>();
    if managers.find_one(Filter::all().eq("email", email.as_str())).await?.is_some() {
        return Err(ApiError::conflict("A manager with this email already exists"));
    }

    let password_hash = state.hasher.hash(&request.password)?;
    let manager = request.into_manager(email, password_hash, state.now());
    managers.insert(&manager).await?;

    tracing::info!("Admin {} created manager {}", subject.id, manager.id);
    Ok(ApiResponse::created(Public(manager)))
}

pub async fn appointments_list(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    Query(scope): Query<CompanyScope>,
) -> ApiResult<Vec<AppointmentSlot>> {
    let companies = scoped_companies(&state, &subject, &scope).await?;
    let booked = find_in_companies::<AppointmentSlot>(&state, &companies, Filter::all().eq("active", true)).await?;
    Ok(ApiResponse::success(booked))
}
