//! Ledger errors.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("wallet {0} not found")]
    WalletNotFound(UserId),

    #[error("insufficient funds in wallet {wallet}: available {available}, required {required}")]
    InsufficientFunds {
        wallet: UserId,
        available: Decimal,
        required: Decimal,
    },
}

impl From<LedgerError> for DomainError {
    fn from(err: LedgerError) -> Self {
        let code = match &err {
            LedgerError::WalletNotFound(_) => ErrorCode::WalletNotFound,
            LedgerError::InsufficientFunds { .. } => ErrorCode::InsufficientFunds,
        };
        DomainError::new(code, err.to_string())
    }
}
