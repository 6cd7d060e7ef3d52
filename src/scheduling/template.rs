use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::{SlotError, MAX_PERIOD_MINUTES};

/// Weekly recurring shift for one provider. Supplied per request, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityTemplate {
    #[serde(default)]
    pub provider_id: Uuid,
    #[serde(default)]
    pub company_id: Uuid,
    /// Weekday names, full or three-letter, any case.
    pub weekdays: Vec<String>,
    /// "HH:MM"
    pub shift_start: String,
    pub shift_end: String,
    /// Slot length in minutes.
    pub period: i64,
}

/// Parsed, validated form of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftPlan {
    pub weekdays: HashSet<Weekday>,
    pub shift_start: NaiveTime,
    pub shift_end: NaiveTime,
    pub period_minutes: i64,
}

impl AvailabilityTemplate {
    pub fn plan(&self) -> Result<ShiftPlan, SlotError> {
        if self.period <= 0 {
            return Err(SlotError::NonPositivePeriod(self.period));
        }
        if self.period > MAX_PERIOD_MINUTES {
            return Err(SlotError::PeriodTooLong(self.period));
        }

        let weekdays = self
            .weekdays
            .iter()
            .map(|name| {
                name.trim()
                    .parse::<Weekday>()
                    .map_err(|_| SlotError::UnknownWeekday(name.clone()))
            })
            .collect::<Result<HashSet<_>, _>>()?;

        let shift_start = parse_time_of_day("shift_start", &self.shift_start)?;
        let shift_end = parse_time_of_day("shift_end", &self.shift_end)?;
        if shift_end < shift_start {
            return Err(SlotError::ShiftEndsBeforeStart {
                start: self.shift_start.clone(),
                end: self.shift_end.clone(),
            });
        }

        Ok(ShiftPlan {
            weekdays,
            shift_start,
            shift_end,
            period_minutes: self.period,
        })
    }
}

fn parse_time_of_day(field: &'static str, value: &str) -> Result<NaiveTime, SlotError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| SlotError::InvalidTime {
        field,
        value: value.to_string(),
    })
}

/// Request body for publishing availability; the provider and company come
/// from the caller's identity or the URL.
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityRequest {
    pub weekdays: Vec<String>,
    #[serde(alias = "shiftStart")]
    pub shift_start: String,
    #[serde(alias = "shiftEnd")]
    pub shift_end: String,
    pub period: i64,
}

impl AvailabilityRequest {
    pub fn into_template(self, provider_id: Uuid, company_id: Uuid) -> AvailabilityTemplate {
        AvailabilityTemplate {
            provider_id,
            company_id,
            weekdays: self.weekdays,
            shift_start: self.shift_start,
            shift_end: self.shift_end,
            period: self.period,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(weekdays: &[&str], start: &str, end: &str) -> AvailabilityTemplate {
        AvailabilityTemplate {
            provider_id: Uuid::nil(),
            company_id: Uuid::nil(),
            weekdays: weekdays.iter().map(|d| d.to_string()).collect(),
            shift_start: start.into(),
            shift_end: end.into(),
            period: 30,
        }
    }

    #[test]
    fn parses_weekdays_and_times() {
        let plan = template(&["Monday", "fri", " SUNDAY "], "09:00", "17:30").plan().unwrap();
        assert_eq!(plan.weekdays, HashSet::from([Weekday::Mon, Weekday::Fri, Weekday::Sun]));
        assert_eq!(plan.shift_start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(plan.shift_end, NaiveTime::from_hms_opt(17, 30, 0).unwrap());
    }

    #[test]
    fn rejects_unknown_weekday() {
        assert_eq!(
            template(&["Funday"], "09:00", "10:00").plan().unwrap_err(),
            SlotError::UnknownWeekday("Funday".into())
        );
    }

    #[test]
    fn rejects_bad_times() {
        assert!(matches!(
            template(&["Monday"], "9am", "10:00").plan(),
            Err(SlotError::InvalidTime { field: "shift_start", .. })
        ));
        assert!(matches!(
            template(&["Monday"], "09:00", "25:00").plan(),
            Err(SlotError::InvalidTime { field: "shift_end", .. })
        ));
    }

    #[test]
    fn rejects_inverted_shift() {
        assert!(matches!(
            template(&["Monday"], "17:00", "09:00").plan(),
            Err(SlotError::ShiftEndsBeforeStart { .. })
        ));
    }

    #[test]
    fn request_accepts_camel_case_aliases() {
        let req: AvailabilityRequest = serde_json::from_str(
            r#"{"weekdays":["Monday"],"shiftStart":"09:00","shiftEnd":"10:00","period":30}"#,
        )
        .unwrap();
        let t = req.into_template(Uuid::from_u128(7), Uuid::from_u128(8));
        assert_eq!(t.provider_id, Uuid::from_u128(7));
        assert_eq!(t.shift_start, "09:00");
    }
}
