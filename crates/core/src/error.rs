//! Ledger error model.

use thiserror::Error;

use crate::id::AccountId;

/// Result type used across the ledger.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Every variant is a recoverable, caller-reportable condition. Mapping to an
/// external representation (HTTP status etc.) is the transport's job.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LedgerError {
    /// No account is registered under the identifier.
    #[error("account {0} not found")]
    AccountNotFound(AccountId),

    /// A withdrawal asked for more than the current balance.
    #[error("insufficient funds in account {account}: requested {requested:.2}, available {available:.2}")]
    InsufficientFunds {
        account: AccountId,
        requested: f64,
        available: f64,
    },

    /// An amount was negative, zero, or not finite.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl LedgerError {
    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(id: AccountId) -> Self {
        Self::AccountNotFound(id)
    }
}
