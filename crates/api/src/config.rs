//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults suit local development.
//!
//! - `BRIGHTSPOKE_DATA_DIR` - Directory for the document store (default: `data`)
//! - `BRIGHTSPOKE_HOST` - Bind address (default: 127.0.0.1)
//! - `BRIGHTSPOKE_PORT` - Listen port (default: 8000)
//! - `BRIGHTSPOKE_ALLOWED_ORIGIN` - Frontend origin allowed by CORS; must be
//!   an http(s) URL. When unset, CORS is permissive (development).
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (default: development)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Directory holding the document store's collection files
    pub data_dir: PathBuf,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Frontend origin allowed by CORS, normalized without a trailing slash
    pub allowed_origin: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Environment tag attached to Sentry events
    pub sentry_environment: String,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = PathBuf::from(get_env_or_default("BRIGHTSPOKE_DATA_DIR", "data"));
        let host = get_env_or_default("BRIGHTSPOKE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BRIGHTSPOKE_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("BRIGHTSPOKE_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BRIGHTSPOKE_PORT".to_string(), e.to_string())
            })?;

        let allowed_origin = match get_optional_env("BRIGHTSPOKE_ALLOWED_ORIGIN") {
            Some(value) => Some(validate_origin(&value, "BRIGHTSPOKE_ALLOWED_ORIGIN")?),
            None => None,
        };

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_env_or_default("SENTRY_ENVIRONMENT", "development");

        Ok(Self {
            data_dir,
            host,
            port,
            allowed_origin,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate a CORS origin: must be an http(s) URL. Returns the ASCII
/// origin serialization (scheme://host[:port]) so it compares cleanly
/// against `Origin` headers.
fn validate_origin(value: &str, var_name: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("origin must be http or https, got '{}'", parsed.scheme()),
        ));
    }

    Ok(parsed.origin().ascii_serialization())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_origin_accepts_https() {
        let origin = validate_origin("https://shop.brightspoke.dev", "TEST_VAR").unwrap();
        assert_eq!(origin, "https://shop.brightspoke.dev");
    }

    #[test]
    fn test_validate_origin_drops_paths_and_trailing_slashes() {
        let origin = validate_origin("http://localhost:5173/", "TEST_VAR").unwrap();
        assert_eq!(origin, "http://localhost:5173");

        let origin = validate_origin("https://shop.brightspoke.dev/checkout", "TEST_VAR").unwrap();
        assert_eq!(origin, "https://shop.brightspoke.dev");
    }

    #[test]
    fn test_validate_origin_rejects_non_http_schemes() {
        let result = validate_origin("ftp://shop.brightspoke.dev", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_validate_origin_rejects_garbage() {
        let result = validate_origin("not a url", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            data_dir: PathBuf::from("data"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            allowed_origin: None,
            sentry_dsn: None,
            sentry_environment: "development".to_string(),
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }
}
