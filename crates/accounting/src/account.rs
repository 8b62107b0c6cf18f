use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use tally_core::{AccountId, Amount, Entity, LedgerError, LedgerResult};

use crate::audit::{AuditKind, AuditRecord, AuditSink};

/// Point-in-time view of an account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub balance: f64,
}

/// A single balance cell guarded by its own lock.
///
/// The balance is private and only reachable through the guarded operations
/// below; each holds the lock for its whole read-modify-write and emits its
/// audit record before releasing it.
pub struct Account {
    id: AccountId,
    balance: Mutex<f64>,
    audit: Arc<dyn AuditSink>,
}

impl Account {
    /// New zero-balance account. Only the registry allocates ids.
    pub(crate) fn open(id: AccountId, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            id,
            balance: Mutex::new(0.0),
            audit,
        }
    }

    /// Adds `amount` and returns the resulting balance.
    pub fn deposit(&self, amount: Amount) -> f64 {
        let mut balance = self.guard();
        *balance += amount.get();
        let new_balance = *balance;

        tracing::info!(account_id = %self.id, amount = amount.get(), balance = new_balance, "deposit");
        self.audit.record(AuditRecord::new(
            self.id,
            AuditKind::Deposit,
            Some(amount.get()),
            new_balance,
        ));
        new_balance
    }

    /// Subtracts `amount` if the balance covers it; otherwise leaves the
    /// balance untouched and returns [`LedgerError::InsufficientFunds`].
    pub fn withdraw(&self, amount: Amount) -> LedgerResult<f64> {
        let mut balance = self.guard();
        let available = *balance;

        if available < amount.get() {
            tracing::info!(
                account_id = %self.id,
                amount = amount.get(),
                balance = available,
                "insufficient funds"
            );
            self.audit.record(AuditRecord::new(
                self.id,
                AuditKind::InsufficientFunds,
                Some(amount.get()),
                available,
            ));
            return Err(LedgerError::InsufficientFunds {
                account: self.id,
                requested: amount.get(),
                available,
            });
        }

        *balance -= amount.get();
        let new_balance = *balance;

        tracing::info!(account_id = %self.id, amount = amount.get(), balance = new_balance, "withdrawal");
        self.audit.record(AuditRecord::new(
            self.id,
            AuditKind::Withdrawal,
            Some(amount.get()),
            new_balance,
        ));
        Ok(new_balance)
    }

    /// Current balance (recorded as a balance check).
    pub fn balance(&self) -> f64 {
        let balance = self.guard();
        let current = *balance;

        tracing::info!(account_id = %self.id, balance = current, "balance check");
        self.audit.record(AuditRecord::new(
            self.id,
            AuditKind::BalanceCheck,
            None,
            current,
        ));
        current
    }

    /// Id and balance without producing an audit record.
    pub fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            id: self.id,
            balance: *self.guard(),
        }
    }

    // The balance is replaced by a single store, so a panic elsewhere while
    // the lock was held can't leave it half-written.
    fn guard(&self) -> MutexGuard<'_, f64> {
        self.balance.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> AccountId {
        self.id
    }
}

impl core::fmt::Debug for Account {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("balance", &*self.guard())
            .finish_non_exhaustive()
    }
}
