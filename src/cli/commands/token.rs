use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::load_config;
use crate::auth::{Role, RoleKeys, TokenService};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::clock::SystemClock;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Mint a token signed with a role's secret")]
    Issue {
        #[arg(long, help = "Role tag: user, provider, manager, admin or superuser")]
        role: Role,
        #[arg(long, help = "Subject id (random if omitted)")]
        subject: Option<Uuid>,
        #[arg(long, help = "Lifetime in hours (defaults to the configured expiry)")]
        hours: Option<u64>,
    },

    #[command(about = "Check a token against one role's gate")]
    Verify {
        #[arg(long, help = "Gate to verify against")]
        role: Role,
        #[arg(help = "Bearer token")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config()?;
    let keys = RoleKeys::from_config(&config.security.role_secrets);

    match cmd {
        TokenCommands::Issue { role, subject, hours } => {
            let hours = hours.unwrap_or(config.security.token_expiry_hours);
            let ttl = chrono::Duration::try_hours(i64::try_from(hours)?)
                .ok_or_else(|| anyhow::anyhow!("token lifetime of {} hours is out of range", hours))?;
            let tokens = TokenService::new(keys, ttl, Arc::new(SystemClock));

            let subject = subject.unwrap_or_else(Uuid::new_v4).to_string();
            let issued = tokens.issue(&subject, role)?;

            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    &format!("Issued {} token", role),
                    Some(json!({
                        "token": issued.token,
                        "role": role,
                        "sub": subject,
                        "expires_at": issued.expires_at,
                    })),
                ),
                OutputFormat::Text => {
                    println!("{}", issued.token);
                    Ok(())
                }
            }
        }
        TokenCommands::Verify { role, token } => {
            let ttl = chrono::Duration::hours(crate::auth::DEFAULT_TOKEN_TTL_HOURS);
            let tokens = TokenService::new(keys, ttl, Arc::new(SystemClock));
            let claims = tokens.verify(token.trim(), role)?;

            output_success(
                &output_format,
                &format!("Valid {} token for {} until {}", claims.role, claims.sub, claims.expires_at()),
                Some(json!({
                    "sub": claims.sub,
                    "role": claims.role,
                    "iat": claims.iat,
                    "exp": claims.exp,
                })),
            )
        }
    }
}
