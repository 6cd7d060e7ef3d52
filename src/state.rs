use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthError, PasswordHasher, Role, RoleKeys, TokenService};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::database::{Collection, DocumentStore};
use crate::mail::Mailer;
use crate::middleware::RoleGate;
use crate::models::Document;

/// Everything a handler needs, built once at startup and shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<TokenService>,
    pub hasher: Arc<PasswordHasher>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AuthError> {
        let keys = RoleKeys::from_config(&config.security.role_secrets);
        let hours = config.security.token_expiry_hours;
        let ttl = i64::try_from(hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .ok_or_else(|| AuthError::TokenGeneration(format!("token expiry of {} hours is out of range", hours)))?;
        let tokens = TokenService::new(keys, ttl, clock.clone());
        let hasher = PasswordHasher::new(&config.security.hashing)?;

        Ok(Self {
            config: Arc::new(config),
            store,
            tokens: Arc::new(tokens),
            hasher: Arc::new(hasher),
            mailer,
            clock,
        })
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Typed collection bounded by the configured operation timeout.
    pub fn collection<T: Document>(&self) -> Collection<T> {
        Collection::new(
            T::COLLECTION,
            self.store.clone(),
            Duration::from_secs(self.config.database.operation_timeout_secs),
        )
    }

    pub fn gate(&self, role: Role) -> RoleGate {
        RoleGate {
            tokens: self.tokens.clone(),
            role,
        }
    }
}
