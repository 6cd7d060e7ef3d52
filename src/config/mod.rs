use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub mail: MailConfig,
    pub verification: VerificationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL; when absent outside production the in-memory store is used.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
    /// Upper bound for any single store operation.
    pub operation_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

/// One signing secret per role tag.
#[derive(Clone, Serialize, Deserialize)]
pub struct RoleSecrets {
    pub user: String,
    pub provider: String,
    pub manager: String,
    pub admin: String,
    pub superuser: String,
}

impl std::fmt::Debug for RoleSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RoleSecrets { .. }")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub role_secrets: RoleSecrets,
    pub token_expiry_hours: u64,
    pub cors_origins: Vec<String>,
    pub hashing: HashingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MailBackend {
    Log,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub backend: MailBackend,
    pub relay_url: Option<String>,
    pub relay_token: Option<String>,
    pub sender: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    pub code_ttl_minutes: i64,
}

const DEV_SECRET_PREFIX: &str = "dev-only-";

/// One year.
pub const MAX_TOKEN_EXPIRY_HOURS: u64 = 24 * 365;

impl AppConfig {
    /// Build from `APP_ENV` presets, apply per-variable overrides, then validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides();

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT_SECS") {
            self.database.connection_timeout_secs = v.parse().unwrap_or(self.database.connection_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_OPERATION_TIMEOUT_SECS") {
            self.database.operation_timeout_secs = v.parse().unwrap_or(self.database.operation_timeout_secs);
        }

        // API overrides
        if let Some(port) = env::var("APP_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        let secrets = &mut self.security.role_secrets;
        for (key, slot) in [
            ("ROLE_SECRET_USER", &mut secrets.user),
            ("ROLE_SECRET_PROVIDER", &mut secrets.provider),
            ("ROLE_SECRET_MANAGER", &mut secrets.manager),
            ("ROLE_SECRET_ADMIN", &mut secrets.admin),
            ("ROLE_SECRET_SUPERUSER", &mut secrets.superuser),
        ] {
            if let Ok(v) = env::var(key) {
                *slot = v;
            }
        }
        if let Ok(v) = env::var("SECURITY_TOKEN_EXPIRY_HOURS") {
            self.security.token_expiry_hours = v.parse().unwrap_or(self.security.token_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Ok(v) = env::var("SECURITY_HASH_MEMORY_KIB") {
            self.security.hashing.memory_kib = v.parse().unwrap_or(self.security.hashing.memory_kib);
        }
        if let Ok(v) = env::var("SECURITY_HASH_ITERATIONS") {
            self.security.hashing.iterations = v.parse().unwrap_or(self.security.hashing.iterations);
        }

        // Mail overrides
        if let Ok(v) = env::var("MAIL_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "http" => self.mail.backend = MailBackend::Http,
                "log" => self.mail.backend = MailBackend::Log,
                other => tracing::warn!("Ignoring unknown MAIL_BACKEND '{}'", other),
            }
        }
        if let Ok(v) = env::var("MAIL_RELAY_URL") {
            self.mail.relay_url = Some(v);
        }
        if let Ok(v) = env::var("MAIL_RELAY_TOKEN") {
            self.mail.relay_token = Some(v);
        }
        if let Ok(v) = env::var("MAIL_SENDER") {
            self.mail.sender = v;
        }

        if let Ok(v) = env::var("VERIFICATION_CODE_TTL_MINUTES") {
            self.verification.code_ttl_minutes = v.parse().unwrap_or(self.verification.code_ttl_minutes);
        }

        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let secrets = &self.security.role_secrets;
        for (key, secret) in [
            ("ROLE_SECRET_USER", &secrets.user),
            ("ROLE_SECRET_PROVIDER", &secrets.provider),
            ("ROLE_SECRET_MANAGER", &secrets.manager),
            ("ROLE_SECRET_ADMIN", &secrets.admin),
            ("ROLE_SECRET_SUPERUSER", &secrets.superuser),
        ] {
            if secret.trim().is_empty() {
                return Err(ConfigError::Missing(key));
            }
            if self.environment == Environment::Production && secret.starts_with(DEV_SECRET_PREFIX) {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "development secret used in production".to_string(),
                });
            }
        }

        if self.security.token_expiry_hours == 0 {
            return Err(ConfigError::Invalid {
                key: "SECURITY_TOKEN_EXPIRY_HOURS",
                reason: "must be positive".to_string(),
            });
        }
        if self.security.token_expiry_hours > MAX_TOKEN_EXPIRY_HOURS {
            return Err(ConfigError::Invalid {
                key: "SECURITY_TOKEN_EXPIRY_HOURS",
                reason: format!("must be at most {}", MAX_TOKEN_EXPIRY_HOURS),
            });
        }
        if self.database.operation_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "DATABASE_OPERATION_TIMEOUT_SECS",
                reason: "must be positive".to_string(),
            });
        }
        if self.environment == Environment::Production && self.database.url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if self.mail.backend == MailBackend::Http && self.mail.relay_url.is_none() {
            return Err(ConfigError::Missing("MAIL_RELAY_URL"));
        }
        if self.verification.code_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "VERIFICATION_CODE_TTL_MINUTES",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    fn dev_secrets() -> RoleSecrets {
        RoleSecrets {
            user: format!("{DEV_SECRET_PREFIX}user-secret"),
            provider: format!("{DEV_SECRET_PREFIX}provider-secret"),
            manager: format!("{DEV_SECRET_PREFIX}manager-secret"),
            admin: format!("{DEV_SECRET_PREFIX}admin-secret"),
            superuser: format!("{DEV_SECRET_PREFIX}superuser-secret"),
        }
    }

    fn empty_secrets() -> RoleSecrets {
        RoleSecrets {
            user: String::new(),
            provider: String::new(),
            manager: String::new(),
            admin: String::new(),
            superuser: String::new(),
        }
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout_secs: 30,
                operation_timeout_secs: 10,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: true,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                role_secrets: Self::dev_secrets(),
                token_expiry_hours: 24,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                hashing: HashingConfig {
                    memory_kib: 19 * 1024,
                    iterations: 2,
                    parallelism: 1,
                },
            },
            mail: MailConfig {
                backend: MailBackend::Log,
                relay_url: None,
                relay_token: None,
                sender: "no-reply@localhost".to_string(),
                timeout_secs: 10,
            },
            verification: VerificationConfig { code_ttl_minutes: 15 },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout_secs: 10,
                operation_timeout_secs: 10,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024,
            },
            security: SecurityConfig {
                role_secrets: Self::empty_secrets(),
                token_expiry_hours: 24,
                cors_origins: vec!["https://staging.example.com".to_string()],
                hashing: HashingConfig {
                    memory_kib: 19 * 1024,
                    iterations: 2,
                    parallelism: 1,
                },
            },
            mail: MailConfig {
                backend: MailBackend::Log,
                relay_url: None,
                relay_token: None,
                sender: "no-reply@staging.example.com".to_string(),
                timeout_secs: 10,
            },
            verification: VerificationConfig { code_ttl_minutes: 15 },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout_secs: 5,
                operation_timeout_secs: 10,
            },
            api: ApiConfig {
                port: 8080,
                enable_request_logging: false,
                max_request_size_bytes: 1024 * 1024,
            },
            security: SecurityConfig {
                role_secrets: Self::empty_secrets(),
                token_expiry_hours: 24,
                cors_origins: vec!["https://app.example.com".to_string()],
                hashing: HashingConfig {
                    memory_kib: 64 * 1024,
                    iterations: 3,
                    parallelism: 1,
                },
            },
            mail: MailConfig {
                backend: MailBackend::Http,
                relay_url: None,
                relay_token: None,
                sender: "no-reply@example.com".to_string(),
                timeout_secs: 10,
            },
            verification: VerificationConfig { code_ttl_minutes: 15 },
        }
    }
}
