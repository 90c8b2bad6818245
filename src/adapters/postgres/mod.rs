//! PostgreSQL adapters - Database implementations of the persistence ports.
//!
//! - `PostgresLedgerStore` - Transactions, wallets and the activity trail
//! - `PostgresEscrowCreator` - Escrow and handover records for purchases

mod escrow_creator;
mod ledger_store;

pub use escrow_creator::PostgresEscrowCreator;
pub use ledger_store::PostgresLedgerStore;
