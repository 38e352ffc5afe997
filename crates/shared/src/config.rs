//! Application configuration management.
//!
//! Configuration is layered: `config/default`, then `config/{RUN_MODE}`,
//! then `INVENTRA__*` environment variables (`__` separates sections, e.g.
//! `INVENTRA__DATABASE__URL`).

use std::str::FromStr;

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Company-wide business settings.
    #[serde(default)]
    pub business: BusinessSettings,
    /// Order workflow policy.
    #[serde(default)]
    pub orders: OrderPolicyConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Typed company settings.
///
/// Every field has a default, so a deployment only overrides what it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessSettings {
    /// Company display name.
    pub company_name: String,
    /// Contact email.
    pub company_email: String,
    /// Contact phone.
    pub company_phone: String,
    /// Public website.
    pub company_website: String,
    /// Postal address.
    pub company_address: String,
    /// Tax rate (percent) applied when an invoice request does not specify one.
    pub default_tax_rate: Decimal,
    /// Currency used for all amounts.
    pub default_currency: Currency,
    /// IANA timezone used to assign orders and payments to calendar days.
    pub timezone: String,
}

impl Default for BusinessSettings {
    fn default() -> Self {
        Self {
            company_name: "My Company".to_string(),
            company_email: "info@mycompany.com".to_string(),
            company_phone: "+1234567890".to_string(),
            company_website: "https://www.mycompany.com".to_string(),
            company_address: "123 Main St, City, Country".to_string(),
            default_tax_rate: Decimal::new(150, 1),
            default_currency: Currency::Usd,
            timezone: "UTC".to_string(),
        }
    }
}

impl BusinessSettings {
    /// Resolves the configured timezone.
    pub fn tz(&self) -> Result<Tz, AppError> {
        Tz::from_str(&self.timezone)
            .map_err(|_| AppError::Validation(format!("Unknown timezone: {}", self.timezone)))
    }
}

/// How strictly order status changes are checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Only the edges of the order transition table are allowed.
    #[default]
    Strict,
    /// Any status may follow any status (manual override).
    Permissive,
}

/// Order workflow configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OrderPolicyConfig {
    /// Transition policy for order status updates.
    #[serde(default)]
    pub transition_policy: TransitionPolicy,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or the business
    /// timezone is not a known IANA name.
    pub fn load() -> Result<Self, AppError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("INVENTRA").separator("__"))
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| AppError::Internal(format!("Failed to load configuration: {e}")))?;

        config.business.tz()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_business_settings_defaults() {
        let settings = BusinessSettings::default();
        assert_eq!(settings.company_name, "My Company");
        assert_eq!(settings.company_email, "info@mycompany.com");
        assert_eq!(settings.default_tax_rate, dec!(15.0));
        assert_eq!(settings.default_currency, Currency::Usd);
        assert_eq!(settings.tz().unwrap(), chrono_tz::UTC);
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let settings = BusinessSettings {
            timezone: "Mars/Olympus".to_string(),
            ..BusinessSettings::default()
        };
        assert!(matches!(settings.tz(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("INVENTRA__DATABASE__URL", Some("sqlite::memory:")),
                ("INVENTRA__SERVER__PORT", Some("9090")),
                ("INVENTRA__BUSINESS__COMPANY_NAME", Some("Acme")),
                ("INVENTRA__BUSINESS__TIMEZONE", Some("Asia/Riyadh")),
                ("INVENTRA__ORDERS__TRANSITION_POLICY", Some("permissive")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.business.company_name, "Acme");
                assert_eq!(config.business.company_phone, "+1234567890");
                assert_eq!(config.business.tz().unwrap(), chrono_tz::Asia::Riyadh);
                assert_eq!(
                    config.orders.transition_policy,
                    TransitionPolicy::Permissive
                );
            },
        );
    }

    #[test]
    fn test_load_rejects_bad_timezone() {
        temp_env::with_vars(
            [
                ("INVENTRA__DATABASE__URL", Some("sqlite::memory:")),
                ("INVENTRA__BUSINESS__TIMEZONE", Some("Nowhere/Town")),
            ],
            || {
                assert!(matches!(AppConfig::load(), Err(AppError::Validation(_))));
            },
        );
    }

    #[test]
    fn test_load_requires_database_url() {
        temp_env::with_vars([("INVENTRA__DATABASE__URL", None::<&str>)], || {
            assert!(matches!(AppConfig::load(), Err(AppError::Internal(_))));
        });
    }
}
