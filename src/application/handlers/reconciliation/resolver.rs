//! Reference resolver - finds the stored transaction an event refers to.

use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::transaction::Transaction;
use crate::domain::webhook::{PayloadReferences, ReferenceCandidate};
use crate::ports::TransactionStore;

/// A transaction together with the candidate that matched it.
#[derive(Debug, Clone)]
pub struct ResolvedTransaction {
    pub transaction: Transaction,
    pub matched: ReferenceCandidate,
}

pub struct ReferenceResolver {
    store: Arc<dyn TransactionStore>,
}

impl ReferenceResolver {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    /// Tries every candidate in order and returns the first hit.
    ///
    /// A store error aborts resolution; a later candidate never masks it.
    pub async fn resolve(
        &self,
        references: &PayloadReferences,
    ) -> Result<Option<ResolvedTransaction>, DomainError> {
        for candidate in references.candidates() {
            if let Some(transaction) = self
                .store
                .find_by_reference(candidate.field, &candidate.value)
                .await?
            {
                tracing::debug!(
                    transaction_id = %transaction.id,
                    source = candidate.source,
                    field = %candidate.field,
                    reference = %candidate.value,
                    "Resolved transaction reference"
                );
                return Ok(Some(ResolvedTransaction {
                    transaction,
                    matched: candidate,
                }));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryLedgerStore;
    use crate::domain::foundation::{Amount, UserId};
    use crate::domain::transaction::{ReferenceField, TransactionKind, TransactionReferences};
    use rust_decimal::Decimal;

    fn withdrawal(primary: &str) -> Transaction {
        Transaction::initiate(
            TransactionKind::Withdrawal,
            UserId::new("seller-1").unwrap(),
            Amount::new(Decimal::new(300, 0)).unwrap(),
            TransactionReferences::new(primary).unwrap(),
        )
    }

    #[tokio::test]
    async fn primary_reference_wins() {
        let store = Arc::new(InMemoryLedgerStore::new());
        let txn = withdrawal("wd_1").with_provider_reference("TRF_1");
        store.insert(&txn).await.unwrap();
        let resolver = ReferenceResolver::new(store);

        let resolved = resolver
            .resolve(&PayloadReferences {
                reference: Some("wd_1".into()),
                id: None,
                transfer_code: Some("TRF_1".into()),
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.transaction.id, txn.id);
        assert_eq!(resolved.matched.field, ReferenceField::Primary);
    }

    #[tokio::test]
    async fn falls_back_to_numeric_gateway_id() {
        let store = Arc::new(InMemoryLedgerStore::new());
        let txn = withdrawal("wd_2").with_gateway_reference("4099");
        store.insert(&txn).await.unwrap();
        let resolver = ReferenceResolver::new(store);

        let resolved = resolver
            .resolve(&PayloadReferences {
                reference: Some("unknown".into()),
                id: Some("4099".into()),
                transfer_code: None,
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.transaction.id, txn.id);
        assert_eq!(resolved.matched.source, "data.id");
    }

    #[tokio::test]
    async fn falls_back_to_transfer_code() {
        let store = Arc::new(InMemoryLedgerStore::new());
        let txn = withdrawal("wd_3").with_provider_reference("TRF_3");
        store.insert(&txn).await.unwrap();
        let resolver = ReferenceResolver::new(store);

        let resolved = resolver
            .resolve(&PayloadReferences {
                reference: None,
                id: None,
                transfer_code: Some("TRF_3".into()),
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolved.matched.field, ReferenceField::Provider);
    }

    #[tokio::test]
    async fn no_match_is_none() {
        let resolver = ReferenceResolver::new(Arc::new(InMemoryLedgerStore::new()));
        let resolved = resolver
            .resolve(&PayloadReferences {
                reference: Some("ghost".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(resolved.is_none());
    }
}
