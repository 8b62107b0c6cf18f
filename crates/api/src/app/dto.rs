use serde::Deserialize;

use tally_accounting::{AccountSnapshot, AuditRecord};
use tally_core::{AccountId, Amount, LedgerResult};

// -------------------------
// Request DTOs
// -------------------------

/// Body of deposit and withdraw requests.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: f64,
}

impl AmountRequest {
    pub fn validate(&self) -> LedgerResult<Amount> {
        Amount::new(self.amount)
    }
}

/// Query string of the audit stream.
#[derive(Debug, Default, Deserialize)]
pub struct StreamQuery {
    pub account_id: Option<AccountId>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn snapshot_to_json(snap: AccountSnapshot) -> serde_json::Value {
    serde_json::json!({
        "id": snap.id,
        "balance": snap.balance,
    })
}

pub fn balance_to_json(balance: f64) -> serde_json::Value {
    serde_json::json!({ "balance": balance })
}

pub fn history_to_json(account_id: AccountId, records: Vec<AuditRecord>) -> serde_json::Value {
    serde_json::json!({
        "account_id": account_id,
        "count": records.len(),
        "items": records,
    })
}
