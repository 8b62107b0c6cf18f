//! Best-effort audit trail of account operations.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tally_core::AccountId;

/// What happened to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    Opened,
    Deposit,
    Withdrawal,
    InsufficientFunds,
    BalanceCheck,
}

impl AuditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditKind::Opened => "opened",
            AuditKind::Deposit => "deposit",
            AuditKind::Withdrawal => "withdrawal",
            AuditKind::InsufficientFunds => "insufficient_funds",
            AuditKind::BalanceCheck => "balance_check",
        }
    }
}

/// One observation of an account.
///
/// `balance` is read inside the critical section that performed the
/// operation, so it is never torn: for a deposit/withdrawal it is the
/// resulting balance, for a rejected withdrawal the unchanged one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub recorded_at: DateTime<Utc>,
    pub account_id: AccountId,
    pub kind: AuditKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub balance: f64,
}

impl AuditRecord {
    pub fn new(account_id: AccountId, kind: AuditKind, amount: Option<f64>, balance: f64) -> Self {
        Self {
            recorded_at: Utc::now(),
            account_id,
            kind,
            amount,
            balance,
        }
    }
}

/// Destination for audit records.
///
/// Called while the emitting account's lock is held. Implementations must not
/// call back into the ledger and must not fail the caller.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord);
}

impl<S> AuditSink for Arc<S>
where
    S: AuditSink + ?Sized,
{
    fn record(&self, record: AuditRecord) {
        (**self).record(record)
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _record: AuditRecord) {}
}

/// Bounded in-memory audit log. Oldest entries are dropped once `capacity`
/// is reached.
#[derive(Debug)]
pub struct InMemoryAuditLog {
    capacity: usize,
    inner: Mutex<VecDeque<AuditRecord>>,
}

impl InMemoryAuditLog {
    pub const DEFAULT_CAPACITY: usize = 10_000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All retained records, oldest first.
    pub fn all(&self) -> Vec<AuditRecord> {
        self.entries().iter().cloned().collect()
    }

    /// Retained records for one account, oldest first.
    pub fn for_account(&self, account_id: AccountId) -> Vec<AuditRecord> {
        self.entries()
            .iter()
            .filter(|r| r.account_id == account_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Records are only ever pushed whole, so a poisoned guard is still usable.
    fn entries(&self) -> std::sync::MutexGuard<'_, VecDeque<AuditRecord>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSink for InMemoryAuditLog {
    fn record(&self, record: AuditRecord) {
        let mut entries = self.entries();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(record);
    }
}
