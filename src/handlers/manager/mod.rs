// handlers/manager/mod.rs - /api/manager/* (role: manager)
//
// Managers act on providers within their own company only.

use axum::{
    extract::{Path, State},
    Extension,
};
use uuid::Uuid;

use crate::database::Filter;
use crate::error::ApiError;
use crate::handlers::availability::{publish, AvailabilityReport};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthSubject};
use crate::models::{public, AppointmentSlot, Manager, NewProvider, Provider, Public};
use crate::scheduling::AvailabilityRequest;
use crate::state::AppState;

async fn current(state: &AppState, subject: &AuthSubject) -> Result<Manager, ApiError> {
    Ok(state
        .collection::<Manager>()
        .find_404(Filter::by_id(subject.id), "Manager")
        .await?)
}

pub async fn me(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
) -> ApiResult<Public<Manager>> {
    Ok(ApiResponse::success(Public(current(&state, &subject).await?)))
}

pub async fn providers_list(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
) -> ApiResult<Vec<Public<Provider>>> {
    let manager = current(&state, &subject).await?;
    let providers = state
        .collection::<Provider>()
        .find(Filter::all().eq("company_id", manager.company_id.to_string()))
        .await?;
    Ok(ApiResponse::success(public(providers)))
}

/// Create a provider account in the manager's company.
pub async fn providers_post(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    ApiJson(request): ApiJson<NewProvider>,
) -> ApiResult<Public<Provider>> {
    let email = request.validate()?;
    let manager = current(&state, &subject).await?;
    let providers = state.collection::<Provider>();

    if providers.find_one(Filter::all().eq("email", email.as_str())).await?.is_some() {
        return Err(ApiError::conflict("A provider with this email already exists"));
    }

    let password_hash = state.hasher.hash(&request.password)?;
    let provider = request.into_provider(email, password_hash, manager.company_id, state.now());
    providers.insert(&provider).await?;

    tracing::info!("Manager {} created provider {}", manager.id, provider.id);
    Ok(ApiResponse::created(Public(provider)))
}

/// Publish slots on behalf of a provider in the manager's company. Providers
/// of other companies are reported as not found.
pub async fn provider_availability_post(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    Path(provider_id): Path<Uuid>,
    ApiJson(request): ApiJson<AvailabilityRequest>,
) -> ApiResult<AvailabilityReport> {
    let manager = current(&state, &subject).await?;
    let provider = state
        .collection::<Provider>()
        .find_404(
            Filter::by_id(provider_id).eq("company_id", manager.company_id.to_string()),
            "Provider",
        )
        .await?;
    publish(&state, request.into_template(provider.id, provider.company_id)).await
}

/// Booked slots across the manager's company.
pub async fn appointments_list(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
) -> ApiResult<Vec<AppointmentSlot>> {
    let manager = current(&state, &subject).await?;
    let booked = state
        .collection::<AppointmentSlot>()
        .find(
            Filter::all()
                .eq("company_id", manager.company_id.to_string())
                .eq("active", true),
        )
        .await?;
    Ok(ApiResponse::success(booked))
}
