//! Ledger mutation primitives.
//!
//! Every operation is expressed as a pair of signed deltas on
//! (available, locked). The in-memory and PostgreSQL ledgers both apply
//! those deltas with the same two rules:
//!
//! - available may never drop below zero; the operation is refused instead.
//! - locked is clamped at zero when released, absorbing rounding and
//!   race artifacts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{LedgerError, WalletBalances};
use crate::domain::foundation::{Amount, TransactionId, UserId, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerOperation {
    /// available += amount
    Credit,
    /// available -= amount
    Debit,
    /// available -= amount, locked += amount
    Lock,
    /// locked = max(0, locked - amount)
    ReleaseLock,
    /// available += amount, locked = max(0, locked - amount)
    Refund,
    /// locked += amount (escrowed purchase funds held for a developer)
    EscrowHold,
}

impl LedgerOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerOperation::Credit => "credit",
            LedgerOperation::Debit => "debit",
            LedgerOperation::Lock => "lock",
            LedgerOperation::ReleaseLock => "release_lock",
            LedgerOperation::Refund => "refund",
            LedgerOperation::EscrowHold => "escrow_hold",
        }
    }

    /// Signed (available, locked) deltas for `amount`.
    pub fn deltas(&self, amount: Amount) -> (Decimal, Decimal) {
        let a = amount.value();
        match self {
            LedgerOperation::Credit => (a, Decimal::ZERO),
            LedgerOperation::Debit => (-a, Decimal::ZERO),
            LedgerOperation::Lock => (-a, a),
            LedgerOperation::ReleaseLock => (Decimal::ZERO, -a),
            LedgerOperation::Refund => (a, -a),
            LedgerOperation::EscrowHold => (Decimal::ZERO, a),
        }
    }

    /// Whether this operation may open a wallet that does not exist yet.
    /// Only operations that add funds do.
    pub fn opens_wallet(&self) -> bool {
        matches!(
            self,
            LedgerOperation::Credit | LedgerOperation::Refund | LedgerOperation::EscrowHold
        )
    }

    /// Computes the balances after this operation.
    pub fn apply(
        &self,
        wallet: &UserId,
        current: WalletBalances,
        amount: Amount,
    ) -> Result<WalletBalances, LedgerError> {
        let (available_delta, locked_delta) = self.deltas(amount);
        let available = current.available + available_delta;
        if available < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds {
                wallet: wallet.clone(),
                available: current.available,
                required: -available_delta,
            });
        }
        let locked = (current.locked + locked_delta).max(Decimal::ZERO);
        Ok(WalletBalances { available, locked })
    }
}

impl fmt::Display for LedgerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerOperation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(LedgerOperation::Credit),
            "debit" => Ok(LedgerOperation::Debit),
            "lock" => Ok(LedgerOperation::Lock),
            "release_lock" => Ok(LedgerOperation::ReleaseLock),
            "refund" => Ok(LedgerOperation::Refund),
            "escrow_hold" => Ok(LedgerOperation::EscrowHold),
            other => Err(ValidationError::invalid_format(
                "action",
                format!("unknown ledger operation '{}'", other),
            )),
        }
    }
}

/// Who caused a ledger mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// Reconciliation driven by a gateway webhook.
    PaymentWebhook,
    /// A user-initiated flow (e.g. withdrawal request).
    User(UserId),
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::PaymentWebhook => f.write_str("payment_webhook"),
            Actor::User(id) => write!(f, "user:{}", id),
        }
    }
}

impl FromStr for Actor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment_webhook" => Ok(Actor::PaymentWebhook),
            _ => match s.strip_prefix("user:") {
                Some(id) => Ok(Actor::User(UserId::new(id)?)),
                None => Err(ValidationError::invalid_format(
                    "actor",
                    format!("unknown actor '{}'", s),
                )),
            },
        }
    }
}

/// A fully described ledger mutation, ready to be applied and audited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub wallet_id: UserId,
    pub operation: LedgerOperation,
    pub amount: Amount,
    pub transaction_id: Option<TransactionId>,
    pub actor: Actor,
    pub description: String,
}

impl LedgerEntry {
    pub fn new(
        wallet_id: UserId,
        operation: LedgerOperation,
        amount: Amount,
        actor: Actor,
        description: impl Into<String>,
    ) -> Self {
        Self {
            wallet_id,
            operation,
            amount,
            transaction_id: None,
            actor,
            description: description.into(),
        }
    }

    pub fn for_transaction(mut self, transaction_id: TransactionId) -> Self {
        self.transaction_id = Some(transaction_id);
        self
    }
}
