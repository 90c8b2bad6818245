//! Transaction domain module.
//!
//! - `aggregate` - Transaction entity and its reference set
//! - `status` - TransactionStatus state machine
//! - `kind` - Deposit / withdrawal / property purchase

mod aggregate;
mod kind;
mod status;

pub use aggregate::{PurchaseContext, ReferenceField, Transaction, TransactionReferences};
pub use kind::TransactionKind;
pub use status::TransactionStatus;
