// handlers/availability.rs - slot publishing shared by the provider and manager tiers

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::{ApiResponse, ApiResult};
use crate::models::AppointmentSlot;
use crate::scheduling::{generate_slots, AvailabilityTemplate};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AvailabilityReport {
    pub provider_id: Uuid,
    pub inserted: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Generate a month of slots from `template` and store them as one batch.
///
/// A failed batch is reported with how many slots made it in; those slots
/// are not removed. Re-running for the same window creates duplicates.
pub async fn publish(state: &AppState, template: AvailabilityTemplate) -> ApiResult<AvailabilityReport> {
    let slots = generate_slots(&template, state.now())?;
    let inserted = state.collection::<AppointmentSlot>().insert_many(&slots).await?;

    tracing::info!(
        "Published {} slots for provider {} (company {})",
        inserted,
        template.provider_id,
        template.company_id
    );

    Ok(ApiResponse::created(AvailabilityReport {
        provider_id: template.provider_id,
        inserted,
        first_date: slots.first().map(|s| s.date),
        last_date: slots.last().map(|s| s.date),
    }))
}
