//! Venue connection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::infrastructure::coincheck::{CoincheckConfig, Credentials, DEFAULT_BASE_URL};

/// Venue connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// API secret.
    #[serde(default, skip_serializing)]
    pub api_secret: String,
    /// REST base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl VenueConfig {
    /// The credential pair.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.api_key.clone(), self.api_secret.clone())
    }

    /// HTTP client configuration.
    #[must_use]
    pub fn to_client_config(&self) -> CoincheckConfig {
        CoincheckConfig::new(self.credentials())
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}
