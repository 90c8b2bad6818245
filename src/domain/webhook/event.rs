//! Typed gateway events.
//!
//! The raw envelope is `{"event": "<type>", "data": {...}}`. Known event
//! types are decoded into their own payload structs at the boundary so
//! handlers never probe untyped maps.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::{PayloadReferences, WebhookError};

pub const CHARGE_SUCCESS: &str = "charge.success";
pub const TRANSFER_SUCCESS: &str = "transfer.success";
pub const TRANSFER_FAILED: &str = "transfer.failed";
pub const TRANSFER_REVERSED: &str = "transfer.reversed";

/// Metadata value marking a charge as an escrowed property purchase.
pub const PROPERTY_PURCHASE_PAYMENT_TYPE: &str = "property_purchase";

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Payload of a `charge.success` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChargeData {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    /// Minor units (kobo).
    #[serde(default, deserialize_with = "minor_units")]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

impl ChargeData {
    /// Metadata as an object, decoding the stringified form some
    /// integrations send.
    pub fn metadata(&self) -> Value {
        match &self.metadata {
            Value::String(s) => serde_json::from_str(s).unwrap_or(Value::Null),
            other => other.clone(),
        }
    }

    pub fn payment_type(&self) -> Option<String> {
        self.metadata()
            .get("payment_type")
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    pub fn is_property_purchase(&self) -> bool {
        self.payment_type().as_deref() == Some(PROPERTY_PURCHASE_PAYMENT_TYPE)
    }

    pub fn references(&self) -> PayloadReferences {
        PayloadReferences {
            reference: self.reference.clone(),
            id: self.id.clone(),
            transfer_code: None,
        }
    }
}

/// Payload of the `transfer.*` events.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferData {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub transfer_code: Option<String>,
    /// Minor units (kobo).
    #[serde(default, deserialize_with = "minor_units")]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl TransferData {
    pub fn references(&self) -> PayloadReferences {
        PayloadReferences {
            reference: self.reference.clone(),
            id: self.id.clone(),
            transfer_code: self.transfer_code.clone(),
        }
    }
}

/// An authenticated gateway notification.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    ChargeSuccess(ChargeData),
    TransferSuccess(TransferData),
    TransferFailed(TransferData),
    TransferReversed(TransferData),
    /// Any event type this service does not reconcile.
    Unrecognized { event_type: String },
}

impl GatewayEvent {
    /// Decodes an authenticated body.
    ///
    /// Unknown event types decode successfully as `Unrecognized`; only a
    /// broken envelope or a known event with an undecodable payload is an
    /// error.
    pub fn parse(body: &[u8]) -> Result<Self, WebhookError> {
        let envelope: Envelope = serde_json::from_slice(body)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let event = match envelope.event.as_str() {
            CHARGE_SUCCESS => GatewayEvent::ChargeSuccess(decode(envelope.data)?),
            TRANSFER_SUCCESS => GatewayEvent::TransferSuccess(decode(envelope.data)?),
            TRANSFER_FAILED => GatewayEvent::TransferFailed(decode(envelope.data)?),
            TRANSFER_REVERSED => GatewayEvent::TransferReversed(decode(envelope.data)?),
            _ => GatewayEvent::Unrecognized {
                event_type: envelope.event,
            },
        };
        Ok(event)
    }

    pub fn event_type(&self) -> &str {
        match self {
            GatewayEvent::ChargeSuccess(_) => CHARGE_SUCCESS,
            GatewayEvent::TransferSuccess(_) => TRANSFER_SUCCESS,
            GatewayEvent::TransferFailed(_) => TRANSFER_FAILED,
            GatewayEvent::TransferReversed(_) => TRANSFER_REVERSED,
            GatewayEvent::Unrecognized { event_type } => event_type,
        }
    }

    /// Reference fields echoed by the gateway, empty for unrecognized events.
    pub fn references(&self) -> PayloadReferences {
        match self {
            GatewayEvent::ChargeSuccess(data) => data.references(),
            GatewayEvent::TransferSuccess(data)
            | GatewayEvent::TransferFailed(data)
            | GatewayEvent::TransferReversed(data) => data.references(),
            GatewayEvent::Unrecognized { .. } => PayloadReferences::default(),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(data: Value) -> Result<T, WebhookError> {
    if !data.is_object() {
        return Err(WebhookError::ParseError("event data is not an object".into()));
    }
    serde_json::from_value(data).map_err(|e| WebhookError::ParseError(e.to_string()))
}

/// Gateway ids arrive as numbers on some events and strings on others.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn minor_units<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
