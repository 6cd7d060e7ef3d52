//! Recurring slot generation.
//!
//! A weekly [`AvailabilityTemplate`] is expanded into concrete
//! [`AppointmentSlot`]s for every matching calendar day between today and
//! the same day next month.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::AppointmentSlot;

mod template;

pub use template::{AvailabilityRequest, AvailabilityTemplate, ShiftPlan};

/// Longest slot a template may ask for: one whole day.
pub const MAX_PERIOD_MINUTES: i64 = 24 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("Slot period must be a positive number of minutes, got {0}")]
    NonPositivePeriod(i64),

    #[error("Slot period must not exceed 1440 minutes, got {0}")]
    PeriodTooLong(i64),

    #[error("Unknown weekday '{0}'")]
    UnknownWeekday(String),

    #[error("Invalid {field} '{value}', expected HH:MM")]
    InvalidTime { field: &'static str, value: String },

    #[error("Shift end {end} is before shift start {start}")]
    ShiftEndsBeforeStart { start: String, end: String },

    #[error("Generation horizon is out of range")]
    HorizonOutOfRange,
}

/// First day (inclusive) and last day (exclusive) covered from `now`.
pub fn horizon(now: DateTime<Utc>) -> Result<(NaiveDate, NaiveDate), SlotError> {
    let end = now
        .checked_add_months(Months::new(1))
        .ok_or(SlotError::HorizonOutOfRange)?;
    Ok((now.date_naive(), end.date_naive()))
}

/// Expand `template` over the month starting at `now`.
///
/// Slots are emitted per day in ascending order. When the shift length is not
/// a multiple of the period, the last slot of the day runs past the shift end.
/// Earlier slots on the first day are still emitted even if they start before
/// `now`. Nothing is persisted here.
pub fn generate_slots(
    template: &AvailabilityTemplate,
    now: DateTime<Utc>,
) -> Result<Vec<AppointmentSlot>, SlotError> {
    let plan = template.plan()?;
    let (first, last) = horizon(now)?;
    let period = Duration::try_minutes(plan.period_minutes).ok_or(SlotError::PeriodTooLong(plan.period_minutes))?;

    let mut slots = Vec::new();
    for day in first.iter_days().take_while(|d| *d < last) {
        if !plan.weekdays.contains(&day.weekday()) {
            continue;
        }

        let window_end = day.and_time(plan.shift_end);
        let mut start = day.and_time(plan.shift_start);
        while start < window_end {
            let end = start
                .checked_add_signed(period)
                .ok_or(SlotError::HorizonOutOfRange)?;
            slots.push(AppointmentSlot {
                id: Uuid::new_v4(),
                provider_id: template.provider_id,
                company_id: template.company_id,
                date: day,
                start_time: start,
                end_time: end,
                active: false,
                customer_id: None,
                customer_name: None,
                customer_email: None,
                service: None,
                notes: None,
                booked_at: None,
                created_at: now,
            });
            start = end;
        }
    }

    Ok(slots)
}
