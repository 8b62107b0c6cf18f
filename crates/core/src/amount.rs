//! Validated monetary amounts.

use serde::Serialize;

use crate::error::{LedgerError, LedgerResult};
use crate::value_object::ValueObject;

/// A strictly positive, finite quantity passed to deposit/withdraw.
///
/// Only constructible through [`Amount::new`]; negative "deposits" can't exist.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    pub fn new(value: f64) -> LedgerResult<Self> {
        if !value.is_finite() {
            return Err(LedgerError::invalid_amount(format!("{value} is not finite")));
        }
        if value <= 0.0 {
            return Err(LedgerError::invalid_amount(format!(
                "{value} must be greater than zero"
            )));
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> f64 {
        self.0
    }
}

impl ValueObject for Amount {}

impl TryFrom<f64> for Amount {
    type Error = LedgerError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
