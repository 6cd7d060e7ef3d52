// handlers/provider/mod.rs - /api/provider/* (role: provider)

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::database::Filter;
use crate::handlers::availability::{publish, AvailabilityReport};
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthSubject};
use crate::models::{AppointmentSlot, Provider, Public, ServiceEntry, ServiceRequest, ValidationError};
use crate::scheduling::AvailabilityRequest;
use crate::state::AppState;

async fn current(state: &AppState, subject: &AuthSubject) -> Result<Provider, crate::error::ApiError> {
    Ok(state
        .collection::<Provider>()
        .find_404(Filter::by_id(subject.id), "Provider")
        .await?)
}

pub async fn me(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
) -> ApiResult<Public<Provider>> {
    Ok(ApiResponse::success(Public(current(&state, &subject).await?)))
}

/// Booked slots for the calling provider.
pub async fn appointments_list(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
) -> ApiResult<Vec<AppointmentSlot>> {
    let booked = state
        .collection::<AppointmentSlot>()
        .find(Filter::all().eq("provider_id", subject.id.to_string()).eq("active", true))
        .await?;
    Ok(ApiResponse::success(booked))
}

#[derive(Debug, Deserialize)]
pub struct OwnSlotQuery {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub active: Option<bool>,
}

pub async fn slots_list(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    Query(query): Query<OwnSlotQuery>,
) -> ApiResult<Vec<AppointmentSlot>> {
    let mut filter = Filter::all().eq("provider_id", subject.id.to_string());
    if let Some(date) = query.date {
        filter = filter.eq("date", date.to_string());
    }
    if let Some(active) = query.active {
        filter = filter.eq("active", active);
    }
    let slots = state.collection::<AppointmentSlot>().find(filter).await?;
    Ok(ApiResponse::success(slots))
}

/// Publish a month of slots from the provider's weekly template.
pub async fn availability_post(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    ApiJson(request): ApiJson<AvailabilityRequest>,
) -> ApiResult<AvailabilityReport> {
    let provider = current(&state, &subject).await?;
    publish(&state, request.into_template(provider.id, provider.company_id)).await
}

pub async fn services_list(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
) -> ApiResult<Vec<ServiceEntry>> {
    Ok(ApiResponse::success(current(&state, &subject).await?.service_entries()))
}

async fn store_services(state: &AppState, provider: &Provider) -> Result<Provider, crate::error::ApiError> {
    let mut changes = Map::new();
    changes.insert("services".into(), Value::from(provider.services.clone()));
    changes.insert("updated_at".into(), Value::String(state.now().to_rfc3339()));
    Ok(state
        .collection::<Provider>()
        .update_404(Filter::by_id(provider.id), changes, "Provider")
        .await?)
}

/// Add a service; adding one that is already listed is a no-op (200 instead of 201).
pub async fn services_post(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    ApiJson(request): ApiJson<ServiceRequest>,
) -> ApiResult<Vec<ServiceEntry>> {
    if request.name.trim().is_empty() {
        return Err(ValidationError::field("name", "Service name is required").into());
    }

    let mut provider = current(&state, &subject).await?;
    if !provider.add_service(&request.name) {
        return Ok(ApiResponse::success(provider.service_entries()));
    }

    let updated = store_services(&state, &provider).await?;
    tracing::info!("Provider {} added service '{}'", provider.id, request.name.trim());
    Ok(ApiResponse::created(updated.service_entries()))
}

pub async fn services_delete(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    Path(index): Path<usize>,
) -> ApiResult<Vec<ServiceEntry>> {
    let mut provider = current(&state, &subject).await?;
    let removed = provider.remove_service(index)?;
    let updated = store_services(&state, &provider).await?;
    tracing::info!("Provider {} removed service '{}'", provider.id, removed);
    Ok(ApiResponse::success(updated.service_entries()))
}
