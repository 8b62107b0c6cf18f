//! Strongly-typed account identifier.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Identifier of an account.
///
/// Allocated by the registry from a monotonically increasing counter; never
/// reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(u64);

impl AccountId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for AccountId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<AccountId> for u64 {
    fn from(value: AccountId) -> Self {
        value.0
    }
}

impl FromStr for AccountId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<u64>()
            .map_err(|e| LedgerError::invalid_id(format!("AccountId '{s}': {e}")))?;
        Ok(Self(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_ids() {
        assert_eq!("42".parse::<AccountId>().unwrap(), AccountId::new(42));
    }

    #[test]
    fn rejects_garbage() {
        for input in ["", "abc", "-1", "1.5"] {
            match input.parse::<AccountId>() {
                Err(LedgerError::InvalidId(_)) => {}
                other => panic!("expected InvalidId for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&AccountId::new(3)).unwrap();
        assert_eq!(json, "3");
    }
}
