//! Paystack verification client.
//!
//! Asks the gateway for the current status of a charge. The answer is
//! advisory; every failure mode maps to a `VerificationError` which the
//! reconciliation flow treats as inconclusive.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::ports::{PaymentVerifier, VerificationError, VerificationStatus};

use super::types::{ErrorResponse, VerifyResponse};

pub const DEFAULT_API_BASE_URL: &str = "https://api.paystack.co";

/// Charge status the gateway reports for a completed payment.
const SUCCESS_STATUS: &str = "success";

#[derive(Clone)]
pub struct PaystackConfig {
    secret_key: SecretString,
    api_base_url: String,
    timeout: Duration,
}

impl PaystackConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::new(secret_key.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for PaystackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaystackConfig")
            .field("secret_key", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub struct PaystackVerifier {
    config: PaystackConfig,
    http_client: reqwest::Client,
}

impl PaystackVerifier {
    pub fn new(config: PaystackConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    fn verify_url(&self, reference: &str) -> Result<reqwest::Url, VerificationError> {
        let mut url = reqwest::Url::parse(&self.config.api_base_url)
            .map_err(|e| VerificationError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| VerificationError::InvalidUrl(self.config.api_base_url.clone()))?
            .pop_if_empty()
            .extend(["transaction", "verify", reference]);
        Ok(url)
    }
}

/// Maps a decoded verify response to the gateway's answer.
fn interpret(response: VerifyResponse) -> Result<VerificationStatus, VerificationError> {
    let data = response.data.ok_or_else(|| {
        VerificationError::InvalidResponse(format!(
            "response carries no charge data: {}",
            response.message
        ))
    })?;

    if data.status.eq_ignore_ascii_case(SUCCESS_STATUS) {
        Ok(VerificationStatus::Confirmed)
    } else {
        Ok(VerificationStatus::Rejected {
            status: data.status,
        })
    }
}

#[async_trait]
impl PaymentVerifier for PaystackVerifier {
    async fn verify(&self, reference: &str) -> Result<VerificationStatus, VerificationError> {
        let response = self
            .http_client
            .get(self.verify_url(reference)?)
            .bearer_auth(self.config.secret_key.expose_secret())
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VerificationError::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    VerificationError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorResponse = response.json().await.unwrap_or_default();
            return Err(VerificationError::Provider {
                status: status.as_u16(),
                message: body.message,
            });
        }

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|e| VerificationError::InvalidResponse(e.to_string()))?;

        interpret(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::paystack::VerifiedCharge;

    fn response(status: Option<&str>) -> VerifyResponse {
        VerifyResponse {
            status: true,
            message: "Verification successful".into(),
            data: status.map(|s| VerifiedCharge {
                status: s.into(),
                reference: Some("dep_1".into()),
                amount: Some(500_000),
                currency: Some("NGN".into()),
            }),
        }
    }

    #[test]
    fn success_status_confirms() {
        assert_eq!(
            interpret(response(Some("success"))).unwrap(),
            VerificationStatus::Confirmed
        );
    }

    #[test]
    fn any_other_status_rejects() {
        for status in ["failed", "abandoned", "reversed", "ongoing"] {
            assert_eq!(
                interpret(response(Some(status))).unwrap(),
                VerificationStatus::Rejected {
                    status: status.into()
                }
            );
        }
    }

    #[test]
    fn missing_data_is_invalid_response() {
        assert!(matches!(
            interpret(response(None)),
            Err(VerificationError::InvalidResponse(_))
        ));
    }

    #[test]
    fn verify_url_encodes_reference() {
        let verifier = PaystackVerifier::new(
            PaystackConfig::new("sk_test").with_base_url("http://localhost:9000/"),
        );
        assert_eq!(
            verifier.verify_url("dep 1/x").unwrap().as_str(),
            "http://localhost:9000/transaction/verify/dep%201%2Fx"
        );
    }

    #[test]
    fn unparseable_base_url_is_an_error() {
        let verifier =
            PaystackVerifier::new(PaystackConfig::new("sk_test").with_base_url("not a url"));
        assert!(matches!(
            verifier.verify_url("dep_1"),
            Err(VerificationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn debug_hides_secret() {
        let debug = format!("{:?}", PaystackConfig::new("sk_live_secret"));
        assert!(!debug.contains("sk_live_secret"));
    }

    #[tokio::test]
    async fn unreachable_gateway_is_an_error_not_an_answer() {
        let verifier = PaystackVerifier::new(
            PaystackConfig::new("sk_test")
                .with_base_url("http://127.0.0.1:1")
                .with_timeout(Duration::from_millis(500)),
        );
        let result = verifier.verify("dep_1").await;
        assert!(matches!(
            result,
            Err(VerificationError::Network(_)) | Err(VerificationError::Timeout(_))
        ));
    }
}
