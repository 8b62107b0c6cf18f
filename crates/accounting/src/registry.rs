use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tally_core::{AccountId, Amount, Entity, LedgerError, LedgerResult};

use crate::account::{Account, AccountSnapshot};
use crate::audit::{AuditKind, AuditRecord, AuditSink, NoopAuditSink};

#[derive(Debug)]
struct RegistryState {
    accounts: HashMap<AccountId, Arc<Account>>,
    next_id: u64,
}

/// Owner of the id -> account map and the id counter.
///
/// The registry lock guards only the map and counter. It is always released
/// before an account operation runs, so the registry and account locks never
/// nest. Operations on different accounts share no lock except the audit
/// sink's own, if it has one.
pub struct Registry {
    state: RwLock<RegistryState>,
    audit: Arc<dyn AuditSink>,
}

impl Registry {
    /// First identifier handed out.
    pub const FIRST_ID: u64 = 1;

    pub fn new(audit: Arc<dyn AuditSink>) -> Self {
        Self {
            state: RwLock::new(RegistryState {
                accounts: HashMap::new(),
                next_id: Self::FIRST_ID,
            }),
            audit,
        }
    }

    /// Allocates the next id and registers a zero-balance account under it.
    ///
    /// The `opened` record is written before the write guard drops, so no
    /// other caller can reach the account ahead of it.
    pub fn create_account(&self) -> Arc<Account> {
        let mut state = self.write();
        let id = AccountId::new(state.next_id);
        state.next_id += 1;

        let account = Arc::new(Account::open(id, self.audit.clone()));
        state.accounts.insert(id, account.clone());

        tracing::info!(account_id = %id, "account created");
        self.audit
            .record(AuditRecord::new(id, AuditKind::Opened, None, 0.0));
        account
    }

    /// Resolves `id`; no side effects when it is unknown.
    pub fn lookup(&self, id: AccountId) -> LedgerResult<Arc<Account>> {
        self.read()
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(id))
    }

    pub fn deposit(&self, id: AccountId, amount: Amount) -> LedgerResult<AccountSnapshot> {
        let account = self.lookup(id)?;
        let balance = account.deposit(amount);
        Ok(AccountSnapshot { id, balance })
    }

    pub fn withdraw(&self, id: AccountId, amount: Amount) -> LedgerResult<AccountSnapshot> {
        let account = self.lookup(id)?;
        let balance = account.withdraw(amount)?;
        Ok(AccountSnapshot { id, balance })
    }

    pub fn balance(&self, id: AccountId) -> LedgerResult<f64> {
        Ok(self.lookup(id)?.balance())
    }

    /// Snapshots of every account, ordered by id.
    ///
    /// The account list is copied out under the registry lock; balances are
    /// then read one account at a time.
    pub fn snapshots(&self) -> Vec<AccountSnapshot> {
        let mut accounts: Vec<Arc<Account>> = self.read().accounts.values().cloned().collect();
        accounts.sort_by_key(|a| a.id());
        accounts.iter().map(|a| a.snapshot()).collect()
    }

    pub fn account_ids(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = self.read().accounts.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.read().accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Inserts happen after the counter bump in one critical section and
    // neither can panic halfway, so a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Arc::new(NoopAuditSink))
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.read();
        f.debug_struct("Registry")
            .field("accounts", &state.accounts.len())
            .field("next_id", &state.next_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::InMemoryAuditLog;
    use std::collections::HashSet;

    fn amount(v: f64) -> Amount {
        Amount::new(v).unwrap()
    }

    #[test]
    fn lookup_of_unknown_id_is_not_found() {
        let registry = Registry::default();
        let err = registry.lookup(AccountId::new(99)).unwrap_err();
        assert_eq!(err, LedgerError::AccountNotFound(AccountId::new(99)));
        assert!(registry.is_empty());
    }

    #[test]
    fn freshly_created_account_resolves_with_zero_balance() {
        let registry = Registry::default();
        let created = registry.create_account();

        let found = registry.lookup(created.id()).unwrap();
        assert!(Arc::ptr_eq(&created, &found));
        assert_eq!(found.balance(), 0.0);
    }

    #[test]
    fn ids_start_at_one_and_increase() {
        let registry = Registry::default();
        let ids: Vec<u64> = (0..3).map(|_| registry.create_account().id().get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn concurrent_creates_get_distinct_contiguous_ids() {
        let registry = Registry::default();

        let ids: Vec<AccountId> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..100)
                .map(|_| s.spawn(|| registry.create_account().id()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let unique: HashSet<u64> = ids.iter().map(|id| id.get()).collect();
        assert_eq!(unique.len(), 100);
        assert_eq!(unique, (1..=100).collect::<HashSet<u64>>());
        assert_eq!(registry.len(), 100);
        assert_eq!(registry.account_ids().len(), 100);
    }

    #[test]
    fn thousand_concurrent_deposits_of_one() {
        let registry = Registry::default();
        let id = registry.create_account().id();

        std::thread::scope(|s| {
            for _ in 0..1000 {
                s.spawn(|| registry.deposit(id, amount(1.0)).unwrap());
            }
        });

        assert_eq!(registry.balance(id).unwrap(), 1000.0);
    }

    #[test]
    fn operations_on_unknown_accounts_are_not_found() {
        let registry = Registry::default();
        let missing = AccountId::new(7);

        assert!(matches!(registry.deposit(missing, amount(1.0)), Err(LedgerError::AccountNotFound(_))));
        assert!(matches!(registry.withdraw(missing, amount(1.0)), Err(LedgerError::AccountNotFound(_))));
        assert!(matches!(registry.balance(missing), Err(LedgerError::AccountNotFound(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn withdraw_boundary_through_registry() {
        let registry = Registry::default();
        let id = registry.create_account().id();
        registry.deposit(id, amount(100.00)).unwrap();

        let err = registry.withdraw(id, amount(100.01)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(registry.balance(id).unwrap(), 100.00);

        let snap = registry.withdraw(id, amount(100.00)).unwrap();
        assert_eq!(snap, AccountSnapshot { id, balance: 0.0 });
    }

    #[test]
    fn accounts_do_not_share_balances() {
        let registry = Registry::default();
        let a = registry.create_account().id();
        let b = registry.create_account().id();

        std::thread::scope(|s| {
            for _ in 0..100 {
                s.spawn(|| registry.deposit(a, amount(2.0)).unwrap());
                s.spawn(|| registry.deposit(b, amount(3.0)).unwrap());
            }
        });

        let snaps = registry.snapshots();
        assert_eq!(
            snaps,
            vec![
                AccountSnapshot { id: a, balance: 200.0 },
                AccountSnapshot { id: b, balance: 300.0 },
            ]
        );
    }

    #[test]
    fn creates_are_audited_after_registration() {
        let log = Arc::new(InMemoryAuditLog::new());
        let registry = Registry::new(log.clone());
        let id = registry.create_account().id();
        registry.deposit(id, amount(3.0)).unwrap();

        let kinds: Vec<_> = log.for_account(id).into_iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![AuditKind::Opened, AuditKind::Deposit]);
    }

    #[test]
    fn opened_comes_first_even_when_deposits_race_the_create() {
        const ACCOUNTS: u64 = 200;
        const DEPOSITORS: usize = 4;

        let log = Arc::new(InMemoryAuditLog::new());
        let registry = Registry::new(log.clone());

        std::thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..ACCOUNTS {
                    registry.create_account();
                }
            });
            for _ in 0..DEPOSITORS {
                s.spawn(|| {
                    for raw in 1..=ACCOUNTS {
                        let id = AccountId::new(raw);
                        // Spin until the creator has registered this id.
                        while registry.deposit(id, amount(1.0)).is_err() {
                            std::thread::yield_now();
                        }
                    }
                });
            }
        });

        for raw in 1..=ACCOUNTS {
            let id = AccountId::new(raw);
            let history = log.for_account(id);
            assert_eq!(history.first().map(|r| r.kind), Some(AuditKind::Opened), "account {id}");
            assert_eq!(history.len(), DEPOSITORS + 1);
            assert_eq!(registry.balance(id).unwrap(), DEPOSITORS as f64);
        }
    }
}
