//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, money, errors, state machine)
//! - `transaction` - Money movements and their terminal state machine
//! - `ledger` - Two-balance wallets, ledger operations, audit records
//! - `webhook` - Gateway authentication, typed events, reconciliation outcomes

pub mod foundation;
pub mod ledger;
pub mod transaction;
pub mod webhook;
