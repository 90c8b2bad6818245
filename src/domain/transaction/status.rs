//! Transaction status state machine.
//!
//! `pending → processing → {successful | failed}`, with `pending` also
//! allowed to jump straight to a terminal state (webhooks often arrive
//! before any intermediate processing mark). Terminal states have no
//! outgoing edges.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Created at initiation, no gateway outcome yet.
    Pending,

    /// Gateway accepted the request; outcome outstanding.
    Processing,

    /// Terminal: money moved.
    Successful,

    /// Terminal: money did not move (or was reversed).
    Failed,
}

impl TransactionStatus {
    /// States from which a terminal transition may still happen.
    pub const OPEN: [TransactionStatus; 2] =
        [TransactionStatus::Pending, TransactionStatus::Processing];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Processing => "processing",
            TransactionStatus::Successful => "successful",
            TransactionStatus::Failed => "failed",
        }
    }

    pub fn is_open(&self) -> bool {
        Self::OPEN.contains(self)
    }
}

impl StateMachine for TransactionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use TransactionStatus::*;
        matches!(
            (self, target),
            (Pending, Processing)
                | (Pending, Successful)
                | (Pending, Failed)
                | (Processing, Successful)
                | (Processing, Failed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use TransactionStatus::*;
        match self {
            Pending => vec![Processing, Successful, Failed],
            Processing => vec![Successful, Failed],
            Successful | Failed => vec![],
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "processing" => Ok(TransactionStatus::Processing),
            "successful" => Ok(TransactionStatus::Successful),
            "failed" => Ok(TransactionStatus::Failed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown transaction status '{}'", other),
            )),
        }
    }
}
