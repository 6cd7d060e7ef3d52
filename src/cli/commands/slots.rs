use anyhow::Context;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::Subcommand;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

use crate::cli::utils::output_rows;
use crate::cli::OutputFormat;
use crate::scheduling::{generate_slots, AvailabilityTemplate};

#[derive(Subcommand)]
pub enum SlotsCommands {
    #[command(about = "Expand a weekly template over the coming month")]
    Preview {
        #[arg(help = "Template file (.json, .yaml or .yml)")]
        template: PathBuf,
        #[arg(long, help = "Start instead of now: RFC 3339 timestamp or YYYY-MM-DD")]
        from: Option<String>,
    },
}

pub async fn handle(cmd: SlotsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SlotsCommands::Preview { template, from } => {
            let template = read_template(&template)?;
            let now = match from {
                Some(raw) => parse_start(&raw)?,
                None => Utc::now(),
            };

            let slots = generate_slots(&template, now)?;
            tracing::debug!("Generated {} slots from {}", slots.len(), now);

            let rows: Vec<Value> = slots
                .iter()
                .map(|slot| {
                    json!({
                        "date": slot.date,
                        "weekday": slot.date.format("%a").to_string(),
                        "start": slot.start_time.format("%H:%M").to_string(),
                        "end": slot.end_time.format("%H:%M").to_string(),
                    })
                })
                .collect();
            output_rows(&output_format, "slots", &rows, &["date", "weekday", "start", "end"])
        }
    }
}

fn read_template(path: &Path) -> anyhow::Result<AvailabilityTemplate> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    if is_yaml {
        serde_yaml::from_str(&raw).with_context(|| format!("invalid YAML template {}", path.display()))
    } else {
        serde_json::from_str(&raw).with_context(|| format!("invalid JSON template {}", path.display()))
    }
}

fn parse_start(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("'{}' is neither RFC 3339 nor YYYY-MM-DD", raw))?;
    let midnight = date.and_hms_opt(0, 0, 0).context("date out of range")?;
    Ok(Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_accepts_dates_and_timestamps() {
        assert_eq!(parse_start("2024-02-01").unwrap(), Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(
            parse_start("2024-02-01T10:30:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).unwrap()
        );
        assert!(parse_start("next tuesday").is_err());
    }

    #[test]
    fn yaml_and_json_templates_parse_alike() {
        let dir = std::env::temp_dir().join(format!("appointctl-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let yaml = dir.join("shift.yaml");
        std::fs::write(&yaml, "weekdays: [Monday]\nshift_start: \"09:00\"\nshift_end: \"10:00\"\nperiod: 30\n").unwrap();
        let json = dir.join("shift.json");
        std::fs::write(&json, r#"{"weekdays":["Monday"],"shift_start":"09:00","shift_end":"10:00","period":30}"#).unwrap();

        let from_yaml = read_template(&yaml).unwrap();
        let from_json = read_template(&json).unwrap();
        assert_eq!(from_yaml.weekdays, from_json.weekdays);
        assert_eq!(from_yaml.period, 30);

        let now = parse_start("2024-02-01").unwrap();
        assert_eq!(generate_slots(&from_yaml, now).unwrap().len(), 8);

        std::fs::remove_dir_all(&dir).ok();
    }
}
