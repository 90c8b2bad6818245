//! Gateway webhook signature verification.
//!
//! The gateway signs the exact raw request body with HMAC-SHA512 keyed by
//! the account secret and sends the lowercase hex digest in a header.
//! Verification must run on the unparsed bytes: re-serialising parsed JSON
//! would change the digest.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use super::WebhookError;

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Verifier for gateway webhook signatures.
///
/// The secret is injected at construction so tests and multi-tenant
/// setups can swap it without touching process state.
#[derive(Clone)]
pub struct WebhookSignatureVerifier {
    secret: Option<SecretString>,
}

impl WebhookSignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self::from_optional(Some(secret.into()))
    }

    /// Builds a verifier from possibly-missing configuration.
    ///
    /// An absent or blank secret produces a verifier that rejects every
    /// request with `SecretNotConfigured`.
    pub fn from_optional(secret: Option<String>) -> Self {
        let secret = secret
            .filter(|s| !s.trim().is_empty())
            .map(SecretString::new);
        Self { secret }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Authenticates `payload` against the signature header value.
    ///
    /// # Errors
    ///
    /// - `SecretNotConfigured` - no secret to verify with (checked first)
    /// - `MissingSignature` - header absent or blank
    /// - `InvalidSignature` - header is not hex or digest differs
    pub fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<(), WebhookError> {
        let secret = self
            .secret
            .as_ref()
            .ok_or(WebhookError::SecretNotConfigured)?;

        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(WebhookError::MissingSignature)?;

        let provided = hex::decode(signature.to_ascii_lowercase())
            .map_err(|_| WebhookError::InvalidSignature)?;

        let expected = compute_signature(secret.expose_secret().as_bytes(), payload)?;

        if !constant_time_compare(&expected, &provided) {
            return Err(WebhookError::InvalidSignature);
        }
        Ok(())
    }
}

impl std::fmt::Debug for WebhookSignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSignatureVerifier")
            .field("configured", &self.is_configured())
            .finish()
    }
}

fn compute_signature(key: &[u8], payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
    let mut mac =
        HmacSha512::new_from_slice(key).map_err(|_| WebhookError::SecretNotConfigured)?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Length check leaks only the length, which is public (64 bytes).
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Hex HMAC-SHA512 of `payload`, as the gateway would send it.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    let mut mac = match HmacSha512::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}
