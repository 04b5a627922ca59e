use std::env;
use std::path::PathBuf;

use super::utils::{parse_env_u16, parse_env_u64};

/// Configuration values read from the environment, every field optional
///
/// Loaded once per configuration build; values present here take priority
/// over both YAML values and defaults.
#[derive(Debug, Default)]
pub(super) struct EnvConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub store_path: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub update_owner: Option<String>,
    pub update_repo: Option<String>,
    pub app_version: Option<String>,
}

impl EnvConfig {
    /// Load configuration overrides from environment variables
    ///
    /// Also loads from a .env file if present, using dotenvy.
    ///
    /// # Errors
    /// Returns an error if a numeric variable is present but malformed.
    pub(super) fn load() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: env::var("HOST").ok(),
            port: parse_env_u16("PORT")?,
            store_path: env::var("STORE_PATH").ok().map(PathBuf::from),
            request_timeout_secs: parse_env_u64("REQUEST_TIMEOUT_SECS")?,
            update_owner: env::var("UPDATE_OWNER").ok(),
            update_repo: env::var("UPDATE_REPO").ok(),
            app_version: env::var("APP_VERSION").ok(),
        })
    }
}
