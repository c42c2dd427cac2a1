//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARKETA_API_URL` - Base URL of the storefront REST API
//!
//! ## Optional
//! - `MARKETA_API_TOKEN` - Bearer token of the signed-in customer
//! - `MARKETA_PRODUCT_CACHE_TTL_SECS` - Product snapshot cache TTL (default: 300)
//! - `MARKETA_CHECKOUT_POLL_INTERVAL_MS` - Payment poll period (default: 3000)
//! - `MARKETA_CHECKOUT_MAX_POLL_ERRORS` - Consecutive poll failures tolerated, 0 = unbounded (default: 5)
//! - `MARKETA_CHECKOUT_MAX_POLL_ATTEMPTS` - Poll ticks before giving up, 0 = unbounded (default: 200)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Default payment poll period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

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

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// REST API connection settings
    pub api: ApiConfig,
    /// Checkout polling policy
    pub checkout: CheckoutConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// REST API connection settings.
///
/// Implements `Debug` manually to redact the bearer token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so relative paths join beneath it
    pub base_url: Url,
    /// Bearer token of the signed-in customer
    pub token: Option<SecretString>,
    /// How long fetched product snapshots are reused
    pub product_cache_ttl: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("product_cache_ttl", &self.product_cache_ttl)
            .finish()
    }
}

impl ApiConfig {
    /// Build an API configuration for `base_url` without credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not absolute.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url("MARKETA_API_URL", base_url)?,
            token: None,
            product_cache_ttl: Duration::from_secs(300),
        })
    }

    /// Attach a bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }
}

/// Payment polling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Delay between payment status requests
    pub poll_interval: Duration,
    /// Consecutive failed poll ticks before the attempt is abandoned
    pub max_poll_errors: Option<u32>,
    /// Total poll ticks before the attempt is abandoned as timed out
    pub max_poll_attempts: Option<u32>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_errors: Some(5),
            max_poll_attempts: Some(200),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::from_env()?;
        let checkout = CheckoutConfig::from_env()?;

        Ok(Self {
            api,
            checkout,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = normalize_base_url("MARKETA_API_URL", &get_required_env("MARKETA_API_URL")?)?;
        let token = get_optional_validated_secret("MARKETA_API_TOKEN")?;
        let ttl_secs: u64 = parse_value(
            "MARKETA_PRODUCT_CACHE_TTL_SECS",
            &get_env_or_default("MARKETA_PRODUCT_CACHE_TTL_SECS", "300"),
        )?;

        Ok(Self {
            base_url,
            token,
            product_cache_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let interval_ms: u64 = parse_value(
            "MARKETA_CHECKOUT_POLL_INTERVAL_MS",
            &get_env_or_default("MARKETA_CHECKOUT_POLL_INTERVAL_MS", "3000"),
        )?;
        if interval_ms == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "MARKETA_CHECKOUT_POLL_INTERVAL_MS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            poll_interval: Duration::from_millis(interval_ms),
            max_poll_errors: parse_bound(
                "MARKETA_CHECKOUT_MAX_POLL_ERRORS",
                &get_env_or_default("MARKETA_CHECKOUT_MAX_POLL_ERRORS", "5"),
            )?,
            max_poll_attempts: parse_bound(
                "MARKETA_CHECKOUT_MAX_POLL_ATTEMPTS",
                &get_env_or_default("MARKETA_CHECKOUT_MAX_POLL_ATTEMPTS", "200"),
            )?,
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

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a raw value, naming the variable in the error.
fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a limit where `0` means "no limit".
fn parse_bound(key: &str, raw: &str) -> Result<Option<u32>, ConfigError> {
    let value: u32 = parse_value(key, raw)?;
    Ok((value > 0).then_some(value))
}

/// Parse the API base URL and make sure relative paths join beneath it.
fn normalize_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    let url = Url::parse(&with_slash)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("not an http(s) base URL: {trimmed}"),
        ));
    }

    Ok(url)
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
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
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

    // Real API tokens have high entropy
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token issued at sign-in."
            ),
        ));
    }

    Ok(())
}

/// Load and validate an optional secret from environment.
fn get_optional_validated_secret(key: &str) -> Result<Option<SecretString>, ConfigError> {
    let Some(value) = get_optional_env(key) else {
        return Ok(None);
    };
    validate_secret_strength(&value, key)?;
    Ok(Some(SecretString::from(value)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-token-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // Sanctum-style personal access token
        let result = validate_secret_strength("12|q8ZkT3vLw9XbN2mRf7YpC4sHd6GjA1uE", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_normalize_base_url_appends_slash() {
        let url = normalize_base_url("TEST_URL", "http://localhost:8000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/");
        assert_eq!(
            url.join("cart/item/5").unwrap().as_str(),
            "http://localhost:8000/api/cart/item/5"
        );
    }

    #[test]
    fn test_normalize_base_url_rejects_relative_and_other_schemes() {
        assert!(normalize_base_url("TEST_URL", "/api").is_err());
        assert!(normalize_base_url("TEST_URL", "mailto:shop@store.test").is_err());
        assert!(normalize_base_url("TEST_URL", "ftp://store.test/api").is_err());
    }

    #[test]
    fn test_parse_bound_zero_disables() {
        assert_eq!(parse_bound("TEST_BOUND", "0").unwrap(), None);
        assert_eq!(parse_bound("TEST_BOUND", " 5 ").unwrap(), Some(5));
        assert!(matches!(
            parse_bound("TEST_BOUND", "-1"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_checkout_config_default() {
        let config = CheckoutConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(3000));
        assert_eq!(config.max_poll_errors, Some(5));
        assert_eq!(config.max_poll_attempts, Some(200));
    }

    #[test]
    fn test_api_config_debug_redacts_token() {
        let config = ApiConfig::new("https://shop.test/api")
            .unwrap()
            .with_token("super_secret_bearer_token");

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("https://shop.test/api/"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_bearer_token"));
    }
}
