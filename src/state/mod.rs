use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::core::store::{ConfigStore, StoreResult};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    /// Backing store for per-engine configuration
    pub store: ConfigStore,
}

impl AppState {
    pub fn new(config: ServerConfig) -> StoreResult<Arc<Self>> {
        let store = ConfigStore::open(&config.store_path)?;
        Ok(Arc::new(Self { config, store }))
    }

    /// Timeout applied to outbound synthesis requests
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }
}
