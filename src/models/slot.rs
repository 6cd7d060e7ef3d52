use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Document;

/// One bookable interval for a provider. `active` flips to true when booked;
/// the generator never touches a slot after creating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentSlot {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub company_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Document for AppointmentSlot {
    const COLLECTION: &'static str = "available_appointments";
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Query string for browsing open slots.
#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub provider_id: Uuid,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}
