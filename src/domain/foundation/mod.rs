//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, money, and error types
//! that form the vocabulary of the wallet ledger.

mod errors;
mod ids;
mod money;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ActivityId, EscrowId, HandoverId, PropertyId, TransactionId, UserId};
pub use money::Amount;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
