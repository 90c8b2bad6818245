//! Wallet Ledger - Payment webhook reconciliation
//!
//! Receives payment-gateway webhooks, authenticates them, and settles the
//! matching transaction exactly once together with its effect on a
//! two-balance wallet (available and locked funds).

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
