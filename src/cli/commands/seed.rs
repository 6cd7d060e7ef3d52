use anyhow::Context;
use chrono::Utc;
use clap::Subcommand;
use serde_json::{json, Map, Value};
use std::time::Duration;

use super::load_config;
use crate::auth::{PasswordHasher, Role};
use crate::cli::utils::{output_success, value_or_stdin};
use crate::cli::OutputFormat;
use crate::database::{self, Collection, Filter};
use crate::models::{normalize_email, Document, User, MIN_PASSWORD_LEN};

#[derive(Subcommand)]
pub enum SeedCommands {
    #[command(about = "Create a superuser account, or promote an existing user")]
    Superuser {
        #[arg(long, help = "Email address")]
        email: String,
        #[arg(long, default_value = "Superuser", help = "Display name for a new account")]
        name: String,
        #[arg(long, help = "Password for a new account (read from stdin if omitted)")]
        password: Option<String>,
    },
}

pub async fn handle(cmd: SeedCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SeedCommands::Superuser { email, name, password } => {
            let config = load_config()?;
            let email = normalize_email(&email)
                .ok_or_else(|| anyhow::anyhow!("'{}' is not a valid email address", email))?;

            let store = database::open(&config.database)
                .await
                .context("failed to open document store")?;
            if config.database.url.is_none() {
                tracing::warn!("No DATABASE_URL set; the seeded account will not outlive this process");
            }
            let users: Collection<User> = Collection::new(
                User::COLLECTION,
                store,
                Duration::from_secs(config.database.operation_timeout_secs),
            );

            if let Some(existing) = users.find_one(Filter::all().eq("email", email.as_str())).await? {
                let mut changes = Map::new();
                changes.insert("super_user".to_string(), Value::Bool(true));
                changes.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));
                users.update_404(Filter::by_id(existing.id), changes, "User").await?;

                return output_success(
                    &output_format,
                    &format!("Promoted {} to superuser", email),
                    Some(json!({ "id": existing.id, "email": email, "created": false })),
                );
            }

            let password = value_or_stdin(password, "password")?;
            if password.chars().count() < MIN_PASSWORD_LEN {
                anyhow::bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
            }
            let password_hash = PasswordHasher::new(&config.security.hashing)?.hash(&password)?;

            let now = Utc::now();
            let user = User {
                id: uuid::Uuid::new_v4(),
                name: name.trim().to_string(),
                email: email.clone(),
                phone: None,
                password_hash,
                role: Role::User,
                company_id: None,
                super_user: true,
                email_verified: true,
                created_at: now,
                updated_at: now,
            };
            users.insert(&user).await?;
            tracing::info!("Seeded superuser {}", user.id);

            output_success(
                &output_format,
                &format!("Created superuser {}", email),
                Some(json!({ "id": user.id, "email": email, "created": true })),
            )
        }
    }
}
