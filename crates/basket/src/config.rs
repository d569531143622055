//! Basket service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BASKET_JWT_SECRET` - Shared HS256 secret for validating bearer tokens
//!   (min 32 chars, high entropy)
//!
//! ## Optional
//! - `BASKET_HOST` - Bind address (default: 127.0.0.1)
//! - `BASKET_PORT` - Listen port (default: 5221)
//! - `BASKET_STORE_URL` - `redis://...`, `rediss://...` or `memory://` (default: memory://)
//! - `BASKET_JWT_ISSUER` - Required `iss` claim
//! - `BASKET_JWT_AUDIENCE` - Required `aud` claim
//! - `BASKET_EVENT_SIGNING_SECRET` - HMAC secret for integration event webhooks;
//!   the webhook route is disabled when unset
//! - `BASKET_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::store::{MEMORY_SCHEME, is_redis_url};

const MIN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Basket service configuration.
#[derive(Debug, Clone)]
pub struct BasketConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Cache backend configuration
    pub store: StoreConfig,
    /// Bearer token validation
    pub auth: AuthConfig,
    /// Integration event webhook secret (route disabled when `None`)
    pub event_signing_secret: Option<SecretString>,
    /// Per-request timeout applied by the transport
    pub request_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Cache backend configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backend URL (may contain a password)
    pub url: SecretString,
}

/// Bearer token validation settings.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared HS256 signing secret
    pub jwt_secret: SecretString,
    /// Required issuer, if any
    pub issuer: Option<String>,
    /// Required audience, if any
    pub audience: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl BasketConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("BASKET_HOST", "127.0.0.1")?;
        let port = parse_env("BASKET_PORT", "5221")?;
        let store = StoreConfig::from_env()?;
        let auth = AuthConfig::from_env()?;

        let event_signing_secret = get_optional_env("BASKET_EVENT_SIGNING_SECRET")
            .map(|value| validated_secret(value, "BASKET_EVENT_SIGNING_SECRET"))
            .transpose()?;

        let timeout_secs: u64 = parse_env("BASKET_REQUEST_TIMEOUT_SECS", "10")?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "BASKET_REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            store,
            auth,
            event_signing_secret,
            request_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl StoreConfig {
    /// Load the cache backend settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for an unsupported URL scheme.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = get_env_or_default("BASKET_STORE_URL", MEMORY_SCHEME);
        validate_store_url(&url)?;

        Ok(Self {
            url: SecretString::from(url),
        })
    }

    /// Returns true if the in-process backend is selected.
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.url.expose_secret().starts_with(MEMORY_SCHEME)
    }
}

impl AuthConfig {
    /// Load bearer token settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `BASKET_JWT_SECRET` is missing or weak.
    pub fn from_env() -> Result<Self, ConfigError> {
        let value = get_required_env("BASKET_JWT_SECRET")?;

        Ok(Self {
            jwt_secret: validated_secret(value, "BASKET_JWT_SECRET")?,
            issuer: get_optional_env("BASKET_JWT_ISSUER"),
            audience: get_optional_env("BASKET_JWT_AUDIENCE"),
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

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Ensure the store URL names a supported backend.
fn validate_store_url(url: &str) -> Result<(), ConfigError> {
    if url.starts_with(MEMORY_SCHEME) || is_redis_url(url) {
        return Ok(());
    }
    Err(ConfigError::InvalidEnvVar(
        "BASKET_STORE_URL".to_string(),
        "expected a redis://, rediss:// or memory:// URL".to_string(),
    ))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is long enough, not a placeholder, and has
/// sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SECRET_LENGTH,
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Validate a secret value and wrap it.
fn validated_secret(value: String, key: &str) -> Result<SecretString, ConfigError> {
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
