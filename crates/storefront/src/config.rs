//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_API_URL` - Catalog API base URL (default: `https://api.taiyuan.dudustudio.monster`)
//! - `STOREFRONT_TOKEN_PATH` - File holding the persisted bearer token (default: `.storefront-token`)
//! - `STOREFRONT_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `STOREFRONT_TOP_PRODUCTS_LIMIT` - Size of the best-seller list (default: 5)
//! - `STOREFRONT_FREE_SHIPPING_THRESHOLD` - Subtotal that ships free (default: 500)
//! - `STOREFRONT_FLAT_SHIPPING_RATE` - Shipping charged below the threshold (default: 60)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use taiyuan_core::Price;
use thiserror::Error;
use url::Url;

use crate::cart::ShippingPolicy;

const DEFAULT_API_URL: &str = "https://api.taiyuan.dudustudio.monster";
const DEFAULT_TOKEN_PATH: &str = ".storefront-token";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Catalog API configuration
    pub api: ApiConfig,
    /// Where the bearer token is persisted between runs
    pub token_path: PathBuf,
    /// Number of best sellers requested from analytics
    pub top_products_limit: u32,
    /// Free-shipping rule applied to cart totals
    pub shipping: ShippingPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Catalog API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every request path is joined onto
    pub base_url: Url,
    /// Per-request timeout handed to the HTTP client
    pub request_timeout: Duration,
}

impl ApiConfig {
    /// Configuration pointing at `base_url` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("STOREFRONT_API_URL", base_url)?,
            request_timeout: Duration::from_secs(30),
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = parse_base_url(
            "STOREFRONT_API_URL",
            &lookup("STOREFRONT_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )?;
        let timeout_secs: u64 = parse_or_default(&lookup, "STOREFRONT_REQUEST_TIMEOUT_SECS", 30)?;
        let token_path = lookup("STOREFRONT_TOKEN_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_TOKEN_PATH), PathBuf::from);
        let top_products_limit = parse_or_default(&lookup, "STOREFRONT_TOP_PRODUCTS_LIMIT", 5)?;

        let defaults = ShippingPolicy::default();
        let shipping = ShippingPolicy {
            free_threshold: parse_price_or_default(
                &lookup,
                "STOREFRONT_FREE_SHIPPING_THRESHOLD",
                defaults.free_threshold,
            )?,
            flat_rate: parse_price_or_default(
                &lookup,
                "STOREFRONT_FLAT_SHIPPING_RATE",
                defaults.flat_rate,
            )?,
        };

        Ok(Self {
            api: ApiConfig {
                base_url,
                request_timeout: Duration::from_secs(timeout_secs),
            },
            token_path,
            top_products_limit,
            shipping,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a base URL, ensuring a trailing slash so relative joins keep any path prefix.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse an optional non-negative amount.
fn parse_price_or_default<F>(lookup: &F, key: &str, default: Price) -> Result<Price, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let amount: Decimal = parse_or_default(lookup, key, default.amount())?;
    if amount.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(Price::new(amount))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api.base_url.as_str(), "https://api.taiyuan.dudustudio.monster/");
        assert_eq!(config.api.request_timeout, Duration::from_secs(30));
        assert_eq!(config.token_path, PathBuf::from(".storefront-token"));
        assert_eq!(config.top_products_limit, 5);
        assert_eq!(config.shipping, ShippingPolicy::default());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config =
            StorefrontConfig::from_lookup(lookup_from(&[("STOREFRONT_API_URL", "http://localhost:4000/api")]))
                .unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:4000/api/");
        assert_eq!(
            config.api.base_url.join("products").unwrap().as_str(),
            "http://localhost:4000/api/products"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = StorefrontConfig::from_lookup(lookup_from(&[("STOREFRONT_API_URL", "not a url")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "STOREFRONT_API_URL"));
    }

    #[test]
    fn test_invalid_timeout() {
        let result = StorefrontConfig::from_lookup(lookup_from(&[(
            "STOREFRONT_REQUEST_TIMEOUT_SECS",
            "soon",
        )]));
        assert!(result.is_err());
    }

    #[test]
    fn test_shipping_overrides() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[
            ("STOREFRONT_FREE_SHIPPING_THRESHOLD", "1000"),
            ("STOREFRONT_FLAT_SHIPPING_RATE", "80.5"),
        ]))
        .unwrap();
        assert_eq!(config.shipping.free_threshold, Price::from_units(1000));
        assert_eq!(config.shipping.flat_rate, Price::from_cents(8050));
    }

    #[test]
    fn test_negative_shipping_rate_rejected() {
        let result = StorefrontConfig::from_lookup(lookup_from(&[(
            "STOREFRONT_FLAT_SHIPPING_RATE",
            "-1",
        )]));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_sentry_dsn_is_ignored() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[("SENTRY_DSN", "")])).unwrap();
        assert!(config.sentry_dsn.is_none());
    }
}
