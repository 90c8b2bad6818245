//! Event router - maps authenticated gateway events to handler families.

use crate::domain::webhook::{
    ChargeData, GatewayEvent, TransferData, TRANSFER_FAILED, TRANSFER_REVERSED,
};

/// Which reconciliation handler an event belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum EventRoute {
    DepositSuccess(ChargeData),
    EscrowPurchaseSuccess(ChargeData),
    WithdrawalSuccess(TransferData),
    /// Covers both `transfer.failed` and `transfer.reversed`.
    WithdrawalFailed {
        data: TransferData,
        event_type: &'static str,
    },
    Unrecognized { event_type: String },
}

impl EventRoute {
    /// Routes an event. Charges are split by their `payment_type` metadata.
    pub fn from_event(event: GatewayEvent) -> Self {
        match event {
            GatewayEvent::ChargeSuccess(data) if data.is_property_purchase() => {
                EventRoute::EscrowPurchaseSuccess(data)
            }
            GatewayEvent::ChargeSuccess(data) => EventRoute::DepositSuccess(data),
            GatewayEvent::TransferSuccess(data) => EventRoute::WithdrawalSuccess(data),
            GatewayEvent::TransferFailed(data) => EventRoute::WithdrawalFailed {
                data,
                event_type: TRANSFER_FAILED,
            },
            GatewayEvent::TransferReversed(data) => EventRoute::WithdrawalFailed {
                data,
                event_type: TRANSFER_REVERSED,
            },
            GatewayEvent::Unrecognized { event_type } => EventRoute::Unrecognized { event_type },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventRoute::DepositSuccess(_) => "deposit_success",
            EventRoute::EscrowPurchaseSuccess(_) => "escrow_purchase_success",
            EventRoute::WithdrawalSuccess(_) => "withdrawal_success",
            EventRoute::WithdrawalFailed { .. } => "withdrawal_failed",
            EventRoute::Unrecognized { .. } => "unrecognized",
        }
    }
}

impl From<GatewayEvent> for EventRoute {
    fn from(event: GatewayEvent) -> Self {
        Self::from_event(event)
    }
}
