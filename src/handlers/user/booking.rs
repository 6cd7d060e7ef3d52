// handlers/user/booking.rs - open slots, booking and the caller's appointments

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::Filter;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthSubject};
use crate::models::{AppointmentSlot, BookingRequest, Provider, SlotQuery, User, ValidationError};
use crate::state::AppState;

/// Unbooked slots for one provider, optionally on one date.
pub async fn slots_list(
    State(state): State<AppState>,
    Query(query): Query<SlotQuery>,
) -> ApiResult<Vec<AppointmentSlot>> {
    let mut filter = Filter::all()
        .eq("provider_id", query.provider_id.to_string())
        .eq("active", false);
    if let Some(date) = query.date {
        filter = filter.eq("date", date.to_string());
    }
    let slots = state.collection::<AppointmentSlot>().find(filter).await?;
    Ok(ApiResponse::success(slots))
}

/// Book a slot for the caller. The update only matches an unbooked slot, so
/// of two concurrent bookings exactly one wins; the other gets 409.
pub async fn slot_book(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
    Path(slot_id): Path<Uuid>,
    ApiJson(request): ApiJson<BookingRequest>,
) -> ApiResult<AppointmentSlot> {
    let slots = state.collection::<AppointmentSlot>();
    let slot = slots.find_404(Filter::by_id(slot_id), "Slot").await?;
    if slot.active {
        return Err(ApiError::conflict("Slot is already booked"));
    }

    if let Some(service) = &request.service {
        let provider = state
            .collection::<Provider>()
            .find_404(Filter::by_id(slot.provider_id), "Provider")
            .await?;
        if !provider.services.iter().any(|s| s.eq_ignore_ascii_case(service.trim())) {
            return Err(ValidationError::field("service", "Provider does not offer this service").into());
        }
    }

    let user = state.collection::<User>().find_404(Filter::by_id(subject.id), "User").await?;

    let mut changes = Map::new();
    changes.insert("active".into(), Value::Bool(true));
    changes.insert("customer_id".into(), Value::String(user.id.to_string()));
    changes.insert("customer_name".into(), Value::String(user.name));
    changes.insert("customer_email".into(), Value::String(user.email));
    if let Some(service) = request.service {
        changes.insert("service".into(), Value::String(service.trim().to_string()));
    }
    if let Some(notes) = request.notes {
        changes.insert("notes".into(), Value::String(notes));
    }
    changes.insert("booked_at".into(), Value::String(state.now().to_rfc3339()));

    let booked = slots
        .update(Filter::by_id(slot_id).eq("active", false), changes)
        .await?
        .ok_or_else(|| ApiError::conflict("Slot is already booked"))?;

    tracing::info!("User {} booked slot {}", subject.id, slot_id);
    Ok(ApiResponse::success(booked))
}

pub async fn appointments_list(
    State(state): State<AppState>,
    Extension(subject): Extension<AuthSubject>,
) -> ApiResult<Vec<AppointmentSlot>> {
    let booked = state
        .collection::<AppointmentSlot>()
        .find(Filter::all().eq("customer_id", subject.id.to_string()).eq("active", true))
        .await?;
    Ok(ApiResponse::success(booked))
}
