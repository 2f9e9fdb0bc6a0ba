//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BUILDHIVE_API_BASE_URL` - Base URL of the backend API
//!
//! ## Optional
//! - `BUILDHIVE_HTTP_TIMEOUT_SECS` - Overall request timeout (default: 30)
//! - `BUILDHIVE_SESSION_FILE` - Path of the persisted session jar
//!   (default: `.buildhive/session.json` under the home directory)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_DIR: &str = ".buildhive";
const DEFAULT_SESSION_FILE: &str = "session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the backend API.
    pub api_base_url: Url,
    /// Overall per-request timeout.
    pub http_timeout: Duration,
    /// Path of the persisted session jar.
    pub session_file: PathBuf,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_required_env("BUILDHIVE_API_BASE_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BUILDHIVE_API_BASE_URL".to_string(), e.to_string())
            })?;

        let http_timeout = match std::env::var("BUILDHIVE_HTTP_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("BUILDHIVE_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?),
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let session_file = std::env::var("BUILDHIVE_SESSION_FILE")
            .map_or_else(|_| default_session_file(), PathBuf::from);

        Ok(Self {
            api_base_url,
            http_timeout,
            session_file,
        })
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Default session jar location under the home directory, falling back to
/// the current directory when no home is set.
fn default_session_file() -> PathBuf {
    let base = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    base.join(DEFAULT_SESSION_DIR).join(DEFAULT_SESSION_FILE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_file_is_under_base_dir() {
        let path = default_session_file();
        assert!(path.ends_with("session.json"));
        assert!(path.to_string_lossy().contains(DEFAULT_SESSION_DIR));
    }

    #[test]
    fn test_missing_base_url_error_display() {
        let err = ConfigError::MissingEnvVar("BUILDHIVE_API_BASE_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: BUILDHIVE_API_BASE_URL"
        );
    }

    #[test]
    fn test_invalid_env_var_error_display() {
        let err = ConfigError::InvalidEnvVar("BUILDHIVE_HTTP_TIMEOUT_SECS".to_string(), "nan".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid environment variable BUILDHIVE_HTTP_TIMEOUT_SECS: nan"
        );
    }
}
