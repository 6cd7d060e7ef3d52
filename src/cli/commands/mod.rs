pub mod password;
pub mod seed;
pub mod slots;
pub mod token;

use anyhow::Context;

use crate::config::AppConfig;

/// Configuration as the server would see it, `.env` included.
pub(crate) fn load_config() -> anyhow::Result<AppConfig> {
    let _ = dotenvy::dotenv();
    AppConfig::from_env().context("invalid configuration")
}
