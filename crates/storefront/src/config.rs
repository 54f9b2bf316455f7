//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `JHYTERMAX_API_BASE` - REST API origin (default: `http://localhost:8000`)
//! - `JHYTERMAX_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `JHYTERMAX_CREDENTIALS_PATH` - Credential file used by the CLI
//!   (default: `$HOME/.jhytermax/credentials.json`)
//! - `JHYTERMAX_REFERENCE_CACHE_SECS` - TTL for cached states/locations (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REFERENCE_CACHE_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Origin of the REST API; endpoint paths are joined onto it.
    pub api_base: Url,
    /// Timeout applied to every HTTP request.
    pub http_timeout: Duration,
    /// Where the CLI persists the credential pair.
    pub credentials_path: PathBuf,
    /// How long delivery states and locations stay cached.
    pub reference_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Configuration pointing at `api_base` with every other setting defaulted.
    #[must_use]
    pub fn new(api_base: Url) -> Self {
        Self {
            api_base,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            credentials_path: default_credentials_path(),
            reference_cache_ttl: Duration::from_secs(DEFAULT_REFERENCE_CACHE_SECS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but cannot
    /// be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base = parse_api_base(
            "JHYTERMAX_API_BASE",
            &get_env_or_default("JHYTERMAX_API_BASE", DEFAULT_API_BASE),
        )?;
        let http_timeout = get_seconds("JHYTERMAX_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let reference_cache_ttl =
            get_seconds("JHYTERMAX_REFERENCE_CACHE_SECS", DEFAULT_REFERENCE_CACHE_SECS)?;
        let credentials_path = get_optional_env("JHYTERMAX_CREDENTIALS_PATH")
            .map_or_else(default_credentials_path, PathBuf::from);

        Ok(Self {
            api_base,
            http_timeout,
            credentials_path,
            reference_cache_ttl,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn get_seconds(key: &str, default: u64) -> Result<Duration, ConfigError> {
    get_optional_env(key).map_or(Ok(Duration::from_secs(default)), |raw| {
        parse_seconds(key, &raw)
    })
}

fn parse_seconds(key: &str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// The API base must be an absolute http(s) URL.
fn parse_api_base(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

fn default_credentials_path() -> PathBuf {
    std::env::var_os("HOME")
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(".jhytermax")
        .join("credentials.json")
}
