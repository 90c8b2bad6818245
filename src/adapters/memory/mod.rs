//! In-memory adapters.
//!
//! Not durable. Used by the test suites and when the service runs without
//! a database.

mod escrow_creator;
mod ledger_store;
mod notifier;

pub use escrow_creator::{EscrowRecord, InMemoryEscrowCreator};
pub use ledger_store::InMemoryLedgerStore;
pub use notifier::RecordingNotifier;
