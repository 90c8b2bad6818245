//! Transaction aggregate.
//!
//! A transaction is created when a payment or withdrawal is initiated
//! (outside this crate) and moves to a terminal status exactly once when
//! the gateway reports the outcome. It is never deleted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::{TransactionKind, TransactionStatus};
use crate::domain::foundation::{
    Amount, PropertyId, StateMachine, Timestamp, TransactionId, UserId, ValidationError,
};

/// Which stored reference column a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceField {
    /// Reference we generated at initiation and sent to the gateway.
    Primary,
    /// Reference the gateway assigned and echoes back.
    Gateway,
    /// Provider-specific handle (e.g. a transfer code).
    Provider,
}

impl fmt::Display for ReferenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReferenceField::Primary => "primary",
            ReferenceField::Gateway => "gateway",
            ReferenceField::Provider => "provider",
        };
        f.write_str(s)
    }
}

/// All references that resolve to one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReferences {
    pub primary: String,
    pub gateway: Option<String>,
    pub provider: Option<String>,
}

impl TransactionReferences {
    pub fn new(primary: impl Into<String>) -> Result<Self, ValidationError> {
        let primary = primary.into();
        if primary.trim().is_empty() {
            return Err(ValidationError::empty_field("reference"));
        }
        Ok(Self {
            primary,
            gateway: None,
            provider: None,
        })
    }

    pub fn get(&self, field: ReferenceField) -> Option<&str> {
        match field {
            ReferenceField::Primary => Some(self.primary.as_str()),
            ReferenceField::Gateway => self.gateway.as_deref(),
            ReferenceField::Provider => self.provider.as_deref(),
        }
    }

    pub fn matches(&self, field: ReferenceField, value: &str) -> bool {
        self.get(field) == Some(value)
    }
}

/// Context needed to open an escrow for a property purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseContext {
    pub buyer_id: UserId,
    pub developer_id: UserId,
    pub property_id: PropertyId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionKind,
    /// Amount recorded at initiation; the only amount the ledger trusts.
    pub amount: Amount,
    pub status: TransactionStatus,
    /// Wallet owner the movement belongs to.
    pub owner_id: UserId,
    /// Developer id for purchases, bank account id for withdrawals.
    pub counterpart: Option<String>,
    pub references: TransactionReferences,
    pub metadata: Value,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub failed_at: Option<Timestamp>,
    pub webhook_received_at: Option<Timestamp>,
}

impl Transaction {
    /// Creates a pending transaction as the initiation flow would.
    pub fn initiate(
        kind: TransactionKind,
        owner_id: UserId,
        amount: Amount,
        references: TransactionReferences,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            kind,
            amount,
            status: TransactionStatus::Pending,
            owner_id,
            counterpart: None,
            references,
            metadata: Value::Object(Default::default()),
            created_at: Timestamp::now(),
            completed_at: None,
            failed_at: None,
            webhook_received_at: None,
        }
    }

    pub fn with_counterpart(mut self, counterpart: impl Into<String>) -> Self {
        self.counterpart = Some(counterpart.into());
        self
    }

    pub fn with_gateway_reference(mut self, reference: impl Into<String>) -> Self {
        self.references.gateway = Some(reference.into());
        self
    }

    pub fn with_provider_reference(mut self, reference: impl Into<String>) -> Self {
        self.references.provider = Some(reference.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Moves the transaction to a terminal status.
    ///
    /// Fails if the transaction is already terminal or `target` is not a
    /// terminal status.
    pub fn finalize(
        &mut self,
        target: TransactionStatus,
        received_at: Timestamp,
    ) -> Result<(), ValidationError> {
        if !target.is_terminal() {
            return Err(ValidationError::invalid_format(
                "status",
                format!("{} is not a terminal status", target),
            ));
        }
        self.status = self.status.transition_to(target)?;
        self.webhook_received_at = Some(received_at);
        match target {
            TransactionStatus::Successful => self.completed_at = Some(received_at),
            _ => self.failed_at = Some(received_at),
        }
        Ok(())
    }

    /// Extracts escrow context for a property purchase.
    pub fn purchase_context(&self) -> Result<PurchaseContext, ValidationError> {
        let developer = self
            .counterpart
            .as_deref()
            .ok_or_else(|| ValidationError::empty_field("developer_id"))?;
        let property = self
            .metadata
            .get("property_id")
            .and_then(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .ok_or_else(|| ValidationError::empty_field("property_id"))?;

        Ok(PurchaseContext {
            buyer_id: self.owner_id.clone(),
            developer_id: UserId::new(developer)?,
            property_id: PropertyId::new(property)?,
        })
    }
}
