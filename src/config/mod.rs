//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `WALLET_LEDGER` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use wallet_ledger::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod notifications;
mod payment;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use notifications::NotificationsConfig;
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a runnable
/// development configuration on the in-memory store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Payment gateway configuration (Paystack)
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Notification delivery
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `WALLET_LEDGER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `WALLET_LEDGER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `WALLET_LEDGER__PAYMENT__SECRET_KEY=...` -> `payment.secret_key = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("WALLET_LEDGER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.payment.validate()?;
        self.notifications.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "WALLET_LEDGER__DATABASE__URL",
        "WALLET_LEDGER__PAYMENT__SECRET_KEY",
        "WALLET_LEDGER__PAYMENT__VERIFY_TIMEOUT_MS",
        "WALLET_LEDGER__PAYMENT__VERIFY_WITH_GATEWAY",
        "WALLET_LEDGER__NOTIFICATIONS__ENDPOINT_URL",
        "WALLET_LEDGER__SERVER__PORT",
        "WALLET_LEDGER__SERVER__ENVIRONMENT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("WALLET_LEDGER__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("WALLET_LEDGER__PAYMENT__SECRET_KEY", "sk_test_xxx");
        env::set_var("WALLET_LEDGER__PAYMENT__VERIFY_TIMEOUT_MS", "2500");
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.payment.secret(), Some("sk_test_xxx"));
        assert_eq!(config.payment.verify_timeout_ms, 2500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_environment_is_runnable() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert!(!config.database.is_configured());
        assert!(config.payment.secret().is_none());
        assert!(config.notifications.endpoint().is_none());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("WALLET_LEDGER__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_verification_can_be_disabled() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("WALLET_LEDGER__PAYMENT__VERIFY_WITH_GATEWAY", "false");
        let result = AppConfig::load();
        clear_env();

        assert!(!result.unwrap().payment.verify_with_gateway);
    }

    #[test]
    fn test_out_of_range_verify_timeout_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("WALLET_LEDGER__PAYMENT__VERIFY_TIMEOUT_MS", "60000");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().validate().is_err());
    }
}
