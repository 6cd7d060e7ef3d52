use serde_json::json;

use super::load_config;
use crate::auth::PasswordHasher;
use crate::cli::utils::{output_success, value_or_stdin};
use crate::cli::OutputFormat;
use crate::models::MIN_PASSWORD_LEN;

pub async fn handle(password: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let password = value_or_stdin(password, "password")?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        anyhow::bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
    }

    let config = load_config()?;
    let hash = PasswordHasher::new(&config.security.hashing)?.hash(&password)?;

    match output_format {
        OutputFormat::Json => output_success(&output_format, "Password hashed", Some(json!({ "hash": hash }))),
        OutputFormat::Text => {
            println!("{}", hash);
            Ok(())
        }
    }
}
