//! Application configuration loaded from environment variables.

use checkout::CheckoutSettings;
use gateway::{PaymentSettings, PesapalConfig};
use thiserror::Error;

/// Errors raised while building the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// An environment variable is set but cannot be parsed.
    #[error("Invalid value for {name}: {value}")]
    InvalidVar { name: &'static str, value: String },
}

/// Server configuration, validated once at startup.
///
/// Optional with defaults:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `VAT_PERCENTAGE` — whole-number VAT rate (default: `18`)
/// - `CURRENCY` — gateway currency code (default: `"UGX"`)
/// - `DATABASE_URL` — postgres connection string; the in-memory store is
///   used when absent
///
/// Required (startup fails naming the missing variable):
/// - `PESAPAL_API_URL`, `PESAPAL_CONSUMER_KEY`, `PESAPAL_CONSUMER_SECRET`
/// - `CALLBACK_URL`, `NOTIFICATION_ID`
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub vat_rate: u32,
    pub currency: String,
    pub callback_url: String,
    pub notification_id: String,
    pub pesapal_api_url: String,
    pub pesapal_consumer_key: String,
    pub pesapal_consumer_secret: String,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidVar { name, value }),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads and validates configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parsed("PORT", 3000)?,
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            database_url: std::env::var("DATABASE_URL").ok(),
            vat_rate: parsed("VAT_PERCENTAGE", 18)?,
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "UGX".to_string()),
            callback_url: required("CALLBACK_URL")?,
            notification_id: required("NOTIFICATION_ID")?,
            pesapal_api_url: required("PESAPAL_API_URL")?,
            pesapal_consumer_key: required("PESAPAL_CONSUMER_KEY")?,
            pesapal_consumer_secret: required("PESAPAL_CONSUMER_SECRET")?,
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The checkout settings derived from this configuration.
    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            vat_rate: self.vat_rate,
            payment: PaymentSettings {
                currency: self.currency.clone(),
                callback_url: self.callback_url.clone(),
                notification_id: self.notification_id.clone(),
            },
        }
    }

    /// The gateway connection settings derived from this configuration.
    pub fn pesapal_config(&self) -> PesapalConfig {
        PesapalConfig {
            api_url: self.pesapal_api_url.clone(),
            consumer_key: self.pesapal_consumer_key.clone(),
            consumer_secret: self.pesapal_consumer_secret.clone(),
        }
    }
}
