//! Storefront configuration loaded from environment variables.
//!
//! Every variable is optional; the defaults produce a storefront that
//! runs entirely from the bundled fixture data.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `STOREFRONT_CONTENT_DIR` - Fixture and blog content directory
//!   (default: crates/storefront/content)
//! - `STOREFRONT_STATIC_DIR` - Static asset directory
//!   (default: crates/storefront/static)
//! - `CATALOG_API_URL` - Base URL of the remote product provider; when
//!   unset, product data comes from fixtures only
//! - `CHECKOUT_DELAY_MS` - Simulated payment processing time (default: 2000)
//! - `CHECKOUT_FREE_SHIPPING_THRESHOLD` - Order value with free shipping
//!   (default: 50)
//! - `CHECKOUT_FLAT_SHIPPING_RATE` - Shipping below the threshold
//!   (default: 8.99)
//! - `CHECKOUT_PROMO_CODE` - Accepted promo code (default: WELCOME10)
//! - `CHECKOUT_PROMO_PERCENT` - Promo discount percentage (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory holding catalog fixtures and blog markdown
    pub content_dir: PathBuf,
    /// Directory holding static assets
    pub static_dir: PathBuf,
    /// Remote catalog provider; `None` means fixtures only
    pub catalog_api: Option<CatalogApiConfig>,
    /// Checkout and cart tuning
    pub checkout: CheckoutConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Remote catalog provider configuration.
#[derive(Debug, Clone)]
pub struct CatalogApiConfig {
    /// Base URL of the provider API, e.g. `http://127.0.0.1:5000/api/`
    pub base_url: Url,
}

/// Checkout and cart pricing rules.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Simulated payment processing time.
    pub delay: Duration,
    /// Subtotal at or above which shipping is free.
    pub free_shipping_threshold: Decimal,
    /// Flat shipping rate below the threshold.
    pub flat_shipping_rate: Decimal,
    /// The single accepted promo code.
    pub promo_code: String,
    /// Discount the promo code grants, in percent of the subtotal.
    pub promo_percent: Decimal,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let content_dir =
            PathBuf::from(get_env_or_default("STOREFRONT_CONTENT_DIR", "crates/storefront/content"));
        let static_dir =
            PathBuf::from(get_env_or_default("STOREFRONT_STATIC_DIR", "crates/storefront/static"));

        let catalog_api = match get_optional_env("CATALOG_API_URL") {
            Some(raw) => Some(CatalogApiConfig {
                base_url: Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("CATALOG_API_URL".to_owned(), e.to_string())
                })?,
            }),
            None => None,
        };

        let checkout = CheckoutConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            content_dir,
            static_dir,
            catalog_api,
            checkout,
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

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            delay: Duration::from_millis(parse_env("CHECKOUT_DELAY_MS", "2000")?),
            free_shipping_threshold: parse_env("CHECKOUT_FREE_SHIPPING_THRESHOLD", "50")?,
            flat_shipping_rate: parse_env("CHECKOUT_FLAT_SHIPPING_RATE", "8.99")?,
            promo_code: get_env_or_default("CHECKOUT_PROMO_CODE", "WELCOME10"),
            promo_percent: parse_env("CHECKOUT_PROMO_PERCENT", "10")?,
        })
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

/// Parse an environment variable, falling back to a default literal.
///
/// The default must itself parse; that is a programmer error, so it is
/// reported through the same `ConfigError` path.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            content_dir: PathBuf::from("content"),
            static_dir: PathBuf::from("static"),
            catalog_api: None,
            checkout: CheckoutConfig {
                delay: Duration::from_millis(2000),
                free_shipping_threshold: Decimal::from(50),
                flat_shipping_rate: Decimal::new(899, 2),
                promo_code: "WELCOME10".to_string(),
                promo_percent: Decimal::from(10),
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let port: u16 = parse_env("VELOUR_TEST_UNSET_PORT", "8080").unwrap();
        assert_eq!(port, 8080);

        let rate: Decimal = parse_env("VELOUR_TEST_UNSET_RATE", "8.99").unwrap();
        assert_eq!(rate, Decimal::new(899, 2));
    }

    #[test]
    fn test_parse_env_rejects_bad_default() {
        let result: Result<u16, _> = parse_env("VELOUR_TEST_UNSET_PORT", "not-a-port");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }
}
