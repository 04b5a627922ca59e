use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Raw YAML configuration, every field optional
///
/// Missing fields fall through to environment variables or defaults
/// during merging.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct YamlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub store_path: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub update: Option<YamlUpdateConfig>,
    pub app_version: Option<String>,
}

/// Update-checker section of the YAML file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct YamlUpdateConfig {
    pub owner: Option<String>,
    pub repo: Option<String>,
}

impl YamlConfig {
    /// Read and parse the YAML configuration file
    pub(super) fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read config file {}: {e}", path.display()))?;
        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Malformed config file {}: {e}", path.display()))?;
        Ok(config)
    }
}
