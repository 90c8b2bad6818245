//! Append-only wallet audit trail.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Actor, LedgerEntry, LedgerOperation, WalletBalances};
use crate::domain::foundation::{ActivityId, Timestamp, TransactionId, UserId};

/// One audit entry per applied ledger mutation. Never updated or deleted,
/// and never consulted for control decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletActivityRecord {
    pub id: ActivityId,
    pub wallet_id: UserId,
    pub actor: Actor,
    pub action: LedgerOperation,
    pub previous: WalletBalances,
    pub current: WalletBalances,
    pub transaction_id: Option<TransactionId>,
    pub description: String,
    pub recorded_at: Timestamp,
}

impl WalletActivityRecord {
    /// Builds the audit record for `entry` moving `previous` to `current`.
    pub fn from_entry(
        entry: &LedgerEntry,
        previous: WalletBalances,
        current: WalletBalances,
    ) -> Self {
        Self {
            id: ActivityId::new(),
            wallet_id: entry.wallet_id.clone(),
            actor: entry.actor.clone(),
            action: entry.operation,
            previous,
            current,
            transaction_id: entry.transaction_id,
            description: entry.description.clone(),
            recorded_at: Timestamp::now(),
        }
    }

    /// Net change of spendable funds.
    pub fn available_delta(&self) -> Decimal {
        self.current.available - self.previous.available
    }

    /// Net change of reserved funds (after clamping).
    pub fn locked_delta(&self) -> Decimal {
        self.current.locked - self.previous.locked
    }
}
