//! Wallet balances.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

/// The two balances of a wallet.
///
/// Both fields are non-negative; every constructor and mutation path
/// upholds this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletBalances {
    /// Spendable funds.
    pub available: Decimal,
    /// Funds reserved for pending withdrawals or escrow.
    pub locked: Decimal,
}

impl WalletBalances {
    pub fn new(available: Decimal, locked: Decimal) -> Option<Self> {
        if available < Decimal::ZERO || locked < Decimal::ZERO {
            return None;
        }
        Some(Self { available, locked })
    }

    pub fn total(&self) -> Decimal {
        self.available + self.locked
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub owner_id: UserId,
    pub balances: WalletBalances,
    pub updated_at: Timestamp,
}

impl Wallet {
    /// An empty wallet for a new user.
    pub fn open(owner_id: UserId) -> Self {
        Self {
            owner_id,
            balances: WalletBalances::default(),
            updated_at: Timestamp::now(),
        }
    }

    pub fn with_balances(owner_id: UserId, balances: WalletBalances) -> Self {
        Self {
            owner_id,
            balances,
            updated_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_balances_are_unrepresentable_through_new() {
        assert!(WalletBalances::new(Decimal::NEGATIVE_ONE, Decimal::ZERO).is_none());
        assert!(WalletBalances::new(Decimal::ZERO, Decimal::NEGATIVE_ONE).is_none());
        let ok = WalletBalances::new(Decimal::new(700, 0), Decimal::new(300, 0)).unwrap();
        assert_eq!(ok.total(), Decimal::new(1000, 0));
    }

    #[test]
    fn opened_wallet_is_empty() {
        let wallet = Wallet::open(UserId::new("u1").unwrap());
        assert_eq!(wallet.balances, WalletBalances::default());
    }
}
