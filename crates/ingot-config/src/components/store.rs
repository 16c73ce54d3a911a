//! Graph store connection configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for the Dgraph HTTP endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the HTTP endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// API key for hosted instances, sent as `X-Auth-Token`
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-request timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_endpoint() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl StoreConfig {
    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
