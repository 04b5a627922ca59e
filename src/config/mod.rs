//! Configuration module for the parlance server
//!
//! Configuration is assembled from up to three layers: built-in defaults, an
//! optional YAML file, and environment variables. Environment variables always
//! override YAML values.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: environment variable loading
//! - `merge`: layering YAML and environment values over the defaults
//! - `validation`: configuration validation logic
//! - `utils`: parsing helpers
//!
//! # Example
//! ```rust,no_run
//! use parlance::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

/// Server configuration
///
/// Contains everything needed to run the parlance server:
/// - Server settings (host, port)
/// - Engine config store location
/// - Outbound request timeout applied to TTS provider calls
/// - Release repository coordinates for the update checker
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // Engine config store (namespaced per-engine key-value file)
    pub store_path: PathBuf,

    // Timeout for outbound synthesis requests, in seconds
    pub request_timeout_secs: u64,

    // Update checker: GitHub repository publishing releases
    pub update_owner: String,
    pub update_repo: String,

    // Version of the running application, compared against release tags
    pub app_version: String,
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable overrides
    ///
    /// Priority order (highest to lowest):
    /// 1. Environment variables
    /// 2. YAML file values
    /// 3. Default values
    ///
    /// # Errors
    /// Returns an error if the YAML file cannot be read or is malformed,
    /// environment variables have invalid formats, or validation fails.
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml = yaml::YamlConfig::load(path)?;
        let env = env::EnvConfig::load()?;
        let config = merge::merge(Some(yaml), env);
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    ///
    /// Values not present in the environment fall back to the defaults.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let env = env::EnvConfig::load()?;
        let config = merge::merge(None, env);
        validation::validate(&config)?;
        Ok(config)
    }

    /// Built-in defaults, the lowest-priority configuration layer
    fn defaults() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            store_path: PathBuf::from("parlance_store.json"),
            request_timeout_secs: 60,
            update_owner: "parlance-project".to_string(),
            update_repo: "parlance".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// The socket address the server binds to
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
