//! Paystack API response shapes used by the verification client.

use serde::Deserialize;

/// Response of `GET /transaction/verify/{reference}`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    /// Whether the API call itself succeeded (not the charge).
    #[serde(default)]
    pub status: bool,

    #[serde(default)]
    pub message: String,

    pub data: Option<VerifiedCharge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedCharge {
    /// Charge status: `success`, `failed`, `abandoned`, `reversed`, ...
    pub status: String,

    #[serde(default)]
    pub reference: Option<String>,

    /// Minor units.
    #[serde(default)]
    pub amount: Option<i64>,

    #[serde(default)]
    pub currency: Option<String>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_verify_response() {
        let body = r#"{
            "status": true,
            "message": "Verification successful",
            "data": {"status": "success", "reference": "dep_1", "amount": 500000, "currency": "NGN"}
        }"#;
        let parsed: VerifyResponse = serde_json::from_str(body).unwrap();
        let data = parsed.data.unwrap();
        assert_eq!(data.status, "success");
        assert_eq!(data.amount, Some(500_000));
    }

    #[test]
    fn tolerates_missing_data() {
        let body = r#"{"status": false, "message": "Transaction reference not found"}"#;
        let parsed: VerifyResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.data.is_none());
        assert!(!parsed.status);
    }
}
