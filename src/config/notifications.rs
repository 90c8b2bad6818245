//! Notification delivery configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Notification delivery configuration
///
/// Without an `endpoint_url` notifications are written to the log only.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    /// Delivery service endpoint
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl NotificationsConfig {
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = self.endpoint() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidUrl("notifications.endpoint_url"));
            }
        }
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    3_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_log_only() {
        let config = NotificationsConfig::default();
        assert!(config.endpoint().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = NotificationsConfig {
            endpoint_url: Some("notify.internal".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = NotificationsConfig {
            endpoint_url: Some("https://notify.internal/send".to_string()),
            timeout_ms: 0,
        };
        assert!(config.validate().is_err());
    }
}
