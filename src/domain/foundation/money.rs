//! Monetary amounts.
//!
//! Amounts are exact decimals in the currency's major unit (naira, not
//! kobo). Gateway payloads carry minor units; conversion happens only for
//! logging and drift checks, never for ledger mutation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Minor units per major unit for the settlement currency.
const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Strictly positive amount of money used by ledger operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Creates an amount, rejecting zero and negative values.
    pub fn new(value: Decimal) -> Result<Self, ValidationError> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::not_positive("amount", value));
        }
        Ok(Self(value))
    }

    /// Builds an amount from integer minor units (e.g. kobo).
    pub fn from_minor_units(minor: i64) -> Result<Self, ValidationError> {
        Self::new(Decimal::new(minor, 2))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the amount in minor units, truncating sub-minor precision.
    pub fn to_minor_units(&self) -> Option<i64> {
        let scaled = self.0.checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))?;
        i64::try_from(scaled.trunc()).ok()
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
