//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LACEUP_API_BASE_URL` - Base URL of the shop API (http or https)
//!
//! ## Optional
//! - `LACEUP_API_TIMEOUT_SECS` - HTTP request timeout (default: 10)
//! - `LACEUP_CART_FILE` - Path of the persisted cart file
//!   (default: laceup-cart.json)
//! - `LACEUP_CART_KEY` - Storage key for the serialized cart
//!   (default: `@laceup:cart`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::store::DEFAULT_STORAGE_KEY;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CART_FILE: &str = "laceup-cart.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Shop API connection configuration.
#[derive(Debug, Clone)]
pub struct ShopApiConfig {
    /// Base URL of the shop API, without a trailing slash.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

/// Cart application configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Shop API configuration.
    pub api: ShopApiConfig,
    /// Path of the persisted cart file.
    pub cart_file: PathBuf,
    /// Storage key for the serialized cart.
    pub storage_key: String,
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = validate_base_url(
            "LACEUP_API_BASE_URL",
            &get_required_env("LACEUP_API_BASE_URL")?,
        )?;

        let timeout_secs = get_env_or_default(
            "LACEUP_API_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("LACEUP_API_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        let cart_file = PathBuf::from(get_env_or_default("LACEUP_CART_FILE", DEFAULT_CART_FILE));
        let storage_key = get_env_or_default("LACEUP_CART_KEY", DEFAULT_STORAGE_KEY);

        Ok(Self {
            api: ShopApiConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            cart_file,
            storage_key,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a base URL parses and uses http(s); returns it without a
/// trailing slash.
fn validate_base_url(var_name: &str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(value.trim_end_matches('/').to_string())
}
