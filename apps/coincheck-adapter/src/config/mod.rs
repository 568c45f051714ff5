//! Configuration module for the Coincheck adapter.
//!
//! Loads YAML configuration with environment variable interpolation and
//! validates it before anything is built from it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use coincheck_adapter::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! let client_config = config.venue.to_client_config();
//! let gateway_config = config.gateway.to_gateway_config();
//! ```

mod gateway;
mod observability;
mod venue;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::coincheck::{CredentialField, capabilities};

pub use gateway::{GatewaySettings, RetrySettings};
pub use observability::{LogFormat, LoggingConfig, ObservabilityConfig};
pub use venue::VenueConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),

    /// Credentials the venue requires are empty.
    #[error("Missing venue credentials: {}", .0.iter().map(CredentialField::as_str).collect::<Vec<_>>().join(", "))]
    MissingCredentials(Vec<CredentialField>),
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdapterConfig {
    /// Venue connection.
    #[serde(default)]
    pub venue: VenueConfig,
    /// Order gateway.
    #[serde(default)]
    pub gateway: GatewaySettings,
    /// Logging and metrics.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<AdapterConfig, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<AdapterConfig, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: AdapterConfig = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. An unset or empty
/// variable without a default becomes the empty string.
#[allow(clippy::expect_used)] // Regex is compile-time constant
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &AdapterConfig) -> Result<(), ConfigError> {
    let missing = capabilities().missing_credentials(&config.venue.credentials());
    if !missing.is_empty() {
        return Err(ConfigError::MissingCredentials(missing));
    }

    if config.venue.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "venue.timeout_secs must be positive".to_string(),
        ));
    }

    if config.gateway.trade_page_size == 0 {
        return Err(ConfigError::ValidationError(
            "gateway.trade_page_size must be positive".to_string(),
        ));
    }

    let retry = &config.gateway.retry;
    if retry.delay_secs == 0 {
        return Err(ConfigError::ValidationError(
            "gateway.retry.delay_secs must be positive".to_string(),
        ));
    }

    if !retry.multiplier.is_finite() || retry.multiplier < 1.0 {
        return Err(ConfigError::ValidationError(
            "gateway.retry.multiplier must be at least 1.0".to_string(),
        ));
    }

    Ok(())
}
