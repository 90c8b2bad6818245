//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `TransactionStore` - Transaction lookup and atomic settlement
//! - `WalletLedger` - Standalone wallet mutations and balance reads
//! - `HealthProbe` - Backing store reachability
//!
//! ## Collaborator Ports
//!
//! - `PaymentVerifier` - Advisory confirmation with the gateway
//! - `EscrowCreator` - Escrow + handover creation for purchases
//! - `Notifier` - Fire-and-forget user notifications

mod escrow_creator;
mod health_probe;
mod notifier;
mod payment_verifier;
mod transaction_store;
mod wallet_ledger;

pub use escrow_creator::{EscrowCreator, EscrowError, EscrowReceipt, EscrowRequest};
pub use health_probe::HealthProbe;
pub use notifier::{Notification, NotificationError, NotificationKind, Notifier};
pub use payment_verifier::{PaymentVerifier, VerificationError, VerificationStatus};
pub use transaction_store::{SettleOutcome, SettleRequest, TransactionStore};
pub use wallet_ledger::WalletLedger;
