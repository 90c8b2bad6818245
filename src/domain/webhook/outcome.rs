//! What happened to a delivery.

use serde::Serialize;
use std::fmt;

/// Result of reconciling one webhook delivery.
///
/// Every variant is acknowledged to the gateway; the name is echoed in the
/// response body and logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationOutcome {
    DepositCredited,
    WithdrawalSettled,
    WithdrawalRefunded,
    EscrowCreated,
    /// Purchase paid but no escrow record exists for it yet.
    EscrowGap,
    AlreadyProcessed,
    TransactionNotFound,
    VerificationRejected,
    KindMismatch,
    Ignored,
    Malformed,
    PersistenceFailed,
}

impl ReconciliationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReconciliationOutcome::DepositCredited => "deposit_credited",
            ReconciliationOutcome::WithdrawalSettled => "withdrawal_settled",
            ReconciliationOutcome::WithdrawalRefunded => "withdrawal_refunded",
            ReconciliationOutcome::EscrowCreated => "escrow_created",
            ReconciliationOutcome::EscrowGap => "escrow_gap",
            ReconciliationOutcome::AlreadyProcessed => "already_processed",
            ReconciliationOutcome::TransactionNotFound => "transaction_not_found",
            ReconciliationOutcome::VerificationRejected => "verification_rejected",
            ReconciliationOutcome::KindMismatch => "kind_mismatch",
            ReconciliationOutcome::Ignored => "ignored",
            ReconciliationOutcome::Malformed => "malformed",
            ReconciliationOutcome::PersistenceFailed => "persistence_failed",
        }
    }

    /// Outcomes that need a human to look at them.
    pub fn needs_attention(&self) -> bool {
        matches!(
            self,
            ReconciliationOutcome::EscrowGap | ReconciliationOutcome::PersistenceFailed
        )
    }
}

impl fmt::Display for ReconciliationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_snake_case_name() {
        let json = serde_json::to_string(&ReconciliationOutcome::TransactionNotFound).unwrap();
        assert_eq!(json, "\"transaction_not_found\"");
        assert_eq!(
            ReconciliationOutcome::EscrowGap.to_string(),
            "escrow_gap"
        );
    }

    #[test]
    fn only_gaps_and_persistence_failures_need_attention() {
        assert!(ReconciliationOutcome::EscrowGap.needs_attention());
        assert!(ReconciliationOutcome::PersistenceFailed.needs_attention());
        assert!(!ReconciliationOutcome::AlreadyProcessed.needs_attention());
        assert!(!ReconciliationOutcome::VerificationRejected.needs_attention());
    }
}
