//! Wallet ledger domain module.
//!
//! Owns the two-balance invariant (available, locked) and the mutation
//! primitives. Persistence adapters apply `LedgerOperation`s atomically
//! per wallet row and always append a `WalletActivityRecord`.

mod activity;
mod errors;
mod operation;
mod wallet;

pub use activity::WalletActivityRecord;
pub use errors::LedgerError;
pub use operation::{Actor, LedgerEntry, LedgerOperation};
pub use wallet::{Wallet, WalletBalances};
