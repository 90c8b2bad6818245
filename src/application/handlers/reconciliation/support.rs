//! Steps shared by every reconciliation handler.

use crate::domain::foundation::DomainError;
use crate::domain::transaction::{Transaction, TransactionKind};
use crate::domain::webhook::{PayloadReferences, ReconciliationOutcome};

use super::resolver::{ReferenceResolver, ResolvedTransaction};

/// Result of locating the transaction an event settles.
pub(super) enum Located {
    /// Open transaction of the expected kind.
    Ready(ResolvedTransaction),
    /// Nothing to do; acknowledge with this outcome.
    Done(ReconciliationOutcome),
}

/// Resolves the event's transaction and applies the guards every handler
/// shares: not found, wrong kind, already terminal.
///
/// The terminal check here is only a fast path. The conditional update in
/// the store is what actually rules out double settlement.
pub(super) async fn locate(
    resolver: &ReferenceResolver,
    references: &PayloadReferences,
    expected: TransactionKind,
    event_type: &str,
    reported_minor: Option<i64>,
) -> Result<Located, DomainError> {
    let Some(resolved) = resolver.resolve(references).await? else {
        tracing::warn!(
            event_type,
            reference = references.primary_hint().unwrap_or("<none>"),
            "No transaction matches webhook references; acknowledging without action"
        );
        return Ok(Located::Done(ReconciliationOutcome::TransactionNotFound));
    };

    let transaction = &resolved.transaction;

    if transaction.kind != expected {
        tracing::warn!(
            event_type,
            transaction_id = %transaction.id,
            reference = %resolved.matched.value,
            stored_kind = %transaction.kind,
            expected_kind = %expected,
            "Webhook refers to a transaction of another kind; ignoring"
        );
        return Ok(Located::Done(ReconciliationOutcome::KindMismatch));
    }

    if !transaction.status.is_open() {
        return Ok(Located::Done(already_processed(transaction, event_type)));
    }

    check_amount_drift(transaction, reported_minor, event_type);
    Ok(Located::Ready(resolved))
}

pub(super) fn already_processed(
    transaction: &Transaction,
    event_type: &str,
) -> ReconciliationOutcome {
    tracing::info!(
        event_type,
        transaction_id = %transaction.id,
        reference = %transaction.references.primary,
        status = %transaction.status,
        "Transaction already settled; duplicate delivery ignored"
    );
    ReconciliationOutcome::AlreadyProcessed
}

/// Warns when the gateway reports a different amount than we recorded.
/// The recorded amount is still the one applied.
fn check_amount_drift(transaction: &Transaction, reported_minor: Option<i64>, event_type: &str) {
    let (Some(reported), Some(recorded)) = (reported_minor, transaction.amount.to_minor_units())
    else {
        return;
    };
    if reported != recorded {
        tracing::warn!(
            event_type,
            transaction_id = %transaction.id,
            reference = %transaction.references.primary,
            recorded_minor = recorded,
            reported_minor = reported,
            "Gateway amount differs from recorded amount; applying recorded amount"
        );
    }
}

/// First non-blank value, used as the reference sent for verification.
pub(super) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
