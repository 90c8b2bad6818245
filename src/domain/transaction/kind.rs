//! Kinds of money movement tracked by the transaction store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Funds entering a user's wallet from the gateway.
    Deposit,
    /// Payout from a wallet to a bank account.
    Withdrawal,
    /// Buyer payment held in escrow for a developer.
    PropertyPurchase,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
            TransactionKind::PropertyPurchase => "property_purchase",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(TransactionKind::Deposit),
            "withdrawal" => Ok(TransactionKind::Withdrawal),
            "property_purchase" => Ok(TransactionKind::PropertyPurchase),
            other => Err(ValidationError::invalid_format(
                "kind",
                format!("unknown transaction kind '{}'", other),
            )),
        }
    }
}
