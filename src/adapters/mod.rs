//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum endpoints (webhook, health)
//! - `postgres` - Durable transaction store, wallet ledger and escrow records
//! - `memory` - In-memory store for tests and database-less runs
//! - `paystack` - Gateway verification client
//! - `notifier` - Log and HTTP notification delivery

pub mod http;
pub mod memory;
pub mod notifier;
pub mod paystack;
pub mod postgres;

pub use memory::{InMemoryEscrowCreator, InMemoryLedgerStore, RecordingNotifier};
pub use notifier::{HttpNotifier, LogNotifier};
pub use paystack::{PaystackConfig, PaystackVerifier};
pub use postgres::{PostgresEscrowCreator, PostgresLedgerStore};
