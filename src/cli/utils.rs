use serde_json::{json, Value};
use std::io::Read;

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Value::Object(fields)) = (data, &mut response) {
                fields.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print rows as aligned text, or as a JSON array under `key`.
pub fn output_rows(
    output_format: &OutputFormat,
    key: &str,
    rows: &[Value],
    columns: &[&str],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ key: rows }))?);
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No {} found", key);
                return Ok(());
            }
            let cells: Vec<Vec<String>> = rows
                .iter()
                .map(|row| columns.iter().map(|c| cell(row.get(*c))).collect())
                .collect();
            let widths: Vec<usize> = columns
                .iter()
                .enumerate()
                .map(|(i, c)| cells.iter().map(|r| r[i].len()).chain([c.len()]).max().unwrap_or(0))
                .collect();

            let header: Vec<String> = columns
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<w$}", c.to_uppercase(), w = *w))
                .collect();
            println!("{}", header.join("  "));
            for row in cells {
                let line: Vec<String> = row
                    .iter()
                    .zip(&widths)
                    .map(|(v, w)| format!("{:<w$}", v, w = *w))
                    .collect();
                println!("{}", line.join("  ").trim_end());
            }
        }
    }
    Ok(())
}

fn cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Use the argument if given, otherwise the first line of stdin.
pub fn value_or_stdin(provided: Option<String>, what: &str) -> anyhow::Result<String> {
    if let Some(value) = provided {
        return Ok(value);
    }

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let value = input.lines().next().unwrap_or("").to_string();
    if value.is_empty() {
        anyhow::bail!("No {} provided", what);
    }
    Ok(value)
}
