//! Payment gateway configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MIN_VERIFY_TIMEOUT_MS: u64 = 100;
const MAX_VERIFY_TIMEOUT_MS: u64 = 30_000;

/// Payment gateway configuration (Paystack)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Gateway secret key. Also the webhook signing key.
    ///
    /// Left unset, the server still starts but every webhook gets HTTP 500.
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Gateway API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Ask the gateway to confirm deposits before crediting
    #[serde(default = "default_verify_with_gateway")]
    pub verify_with_gateway: bool,

    /// Upper bound on one verification call, in milliseconds
    #[serde(default = "default_verify_timeout_ms")]
    pub verify_timeout_ms: u64,
}

impl PaymentConfig {
    /// The secret, if set to something other than whitespace.
    pub fn secret(&self) -> Option<&str> {
        self.secret_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn verify_timeout(&self) -> Duration {
        Duration::from_millis(self.verify_timeout_ms)
    }

    /// Validate payment configuration
    ///
    /// A missing secret is not a validation error.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_VERIFY_TIMEOUT_MS..=MAX_VERIFY_TIMEOUT_MS).contains(&self.verify_timeout_ms) {
            return Err(ValidationError::InvalidVerifyTimeout(self.verify_timeout_ms));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidUrl("payment.api_base_url"));
        }
        if let Some(secret) = self.secret() {
            if !secret.starts_with("sk_") {
                return Err(ValidationError::InvalidPaymentSecret);
            }
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            api_base_url: default_api_base_url(),
            verify_with_gateway: default_verify_with_gateway(),
            verify_timeout_ms: default_verify_timeout_ms(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.paystack.co".to_string()
}

fn default_verify_with_gateway() -> bool {
    true
}

fn default_verify_timeout_ms() -> u64 {
    5_000
}
