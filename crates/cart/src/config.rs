//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ROCKETSHOES_API_URL` - Inventory API base URL (default: `http://localhost:3333`)
//! - `ROCKETSHOES_API_TOKEN` - Bearer token sent to the inventory API
//! - `ROCKETSHOES_API_TIMEOUT_SECS` - Per-request timeout in seconds (default: 10)
//! - `ROCKETSHOES_STORAGE_PATH` - File backing the persistent slot (default: `.rocketshoes/storage.json`)
//! - `ROCKETSHOES_STORAGE_KEY` - Key of the cart slot (default: `@RocketShoes:cart`)
//! - `ROCKETSHOES_CURRENCY` - Display currency code (default: BRL)

use std::path::PathBuf;
use std::time::Duration;

use rocket_shoes_core::CurrencyCode;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default inventory API location (the storefront's local json-server).
pub const DEFAULT_API_URL: &str = "http://localhost:3333";

/// Default slot key, shared with the browser storefront.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

const DEFAULT_STORAGE_PATH: &str = ".rocketshoes/storage.json";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Inventory API configuration
    pub inventory: InventoryConfig,
    /// Persistent slot configuration
    pub storage: StorageConfig,
    /// Currency used to render prices
    pub currency: CurrencyCode,
}

/// Inventory API configuration.
///
/// Implements `Debug` manually to redact the API token.
#[derive(Clone)]
pub struct InventoryConfig {
    /// Base URL; `stock/{id}` and `products/{id}` are resolved against it
    pub base_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for InventoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "api_token",
                &self.api_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl InventoryConfig {
    /// Configuration for an unauthenticated API at `base_url`.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Persistent slot configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// File holding the key-value document
    pub path: PathBuf,
    /// Key the cart is stored under
    pub key: String,
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let base_url = parse_base_url(
            "ROCKETSHOES_API_URL",
            &vars.get_or_default("ROCKETSHOES_API_URL", DEFAULT_API_URL),
        )?;
        let api_token = vars
            .get_optional("ROCKETSHOES_API_TOKEN")
            .filter(|token| !token.is_empty())
            .map(SecretString::from);
        let timeout_secs = vars
            .get_or_default(
                "ROCKETSHOES_API_TIMEOUT_SECS",
                &DEFAULT_TIMEOUT_SECS.to_string(),
            )
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ROCKETSHOES_API_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_API_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let path = PathBuf::from(vars.get_or_default("ROCKETSHOES_STORAGE_PATH", DEFAULT_STORAGE_PATH));
        let key = vars.get_or_default("ROCKETSHOES_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        if key.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let currency = vars
            .get_or_default("ROCKETSHOES_CURRENCY", CurrencyCode::default().code())
            .parse::<CurrencyCode>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ROCKETSHOES_CURRENCY".to_string(), e.to_string())
            })?;

        Ok(Self {
            inventory: InventoryConfig {
                base_url,
                api_token,
                timeout: Duration::from_secs(timeout_secs),
            },
            storage: StorageConfig { path, key },
            currency,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional environment variable.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    /// Get an environment variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }
}

/// Parse the API base URL, making sure relative joins keep its path.
fn parse_base_url(var_name: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    // "http://host/api" must resolve "stock/1" to "/api/stock/1", not "/stock/1"
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CartConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CartConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.inventory.base_url.as_str(), "http://localhost:3333/");
        assert!(config.inventory.api_token.is_none());
        assert_eq!(config.inventory.timeout, Duration::from_secs(10));
        assert_eq!(config.storage.key, "@RocketShoes:cart");
        assert_eq!(config.storage.path, PathBuf::from(".rocketshoes/storage.json"));
        assert_eq!(config.currency, CurrencyCode::BRL);
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let config = load(&[("ROCKETSHOES_API_URL", "https://shop.example.com/api")]).unwrap();
        let stock = config.inventory.base_url.join("stock/4").unwrap();
        assert_eq!(stock.as_str(), "https://shop.example.com/api/stock/4");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = load(&[("ROCKETSHOES_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref name, _) if name == "ROCKETSHOES_API_URL"));

        let err = load(&[("ROCKETSHOES_API_URL", "ftp://example.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(load(&[("ROCKETSHOES_API_TIMEOUT_SECS", "soon")]).is_err());
        assert!(load(&[("ROCKETSHOES_API_TIMEOUT_SECS", "0")]).is_err());
        let config = load(&[("ROCKETSHOES_API_TIMEOUT_SECS", "3")]).unwrap();
        assert_eq!(config.inventory.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_currency_override() {
        let config = load(&[("ROCKETSHOES_CURRENCY", "usd")]).unwrap();
        assert_eq!(config.currency, CurrencyCode::USD);
        assert!(load(&[("ROCKETSHOES_CURRENCY", "doubloons")]).is_err());
    }

    #[test]
    fn test_empty_storage_key_rejected() {
        assert!(load(&[("ROCKETSHOES_STORAGE_KEY", "")]).is_err());
    }

    #[test]
    fn test_inventory_config_debug_redacts_token() {
        let config = load(&[("ROCKETSHOES_API_TOKEN", "super_secret_api_token")]).unwrap();
        let debug_output = format!("{:?}", config.inventory);

        assert!(debug_output.contains("localhost:3333"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_token"));
    }
}
