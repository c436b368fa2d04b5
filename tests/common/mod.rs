#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use chrono::{NaiveDate, NaiveDateTime};
use fintrack_core::{
    config::Config,
    core::{FixedClock, LedgerStore},
    dialogue::{Dialogue, MemorySessionStore},
    errors::{LedgerError, Result},
    ledger::{
        Balance, Budget, BudgetPeriod, BudgetSpend, CategoryTotal, DateRange, NewTransaction,
        Transaction, TransactionKind, User,
    },
    storage::{
        ConnectionConfig, SqliteStorage, StorageBackend, TransactionFilter, TransactionPage,
    },
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn dec(raw: &str) -> Decimal {
    raw.parse().expect("valid decimal")
}

/// Store plus the clock driving it, so tests can move time.
pub struct TestLedger {
    pub store: Arc<LedgerStore>,
    pub clock: Arc<FixedClock>,
}

/// Creates a file-backed ledger in a unique directory with the clock pinned to `today`.
pub fn setup_ledger(today: NaiveDate) -> TestLedger {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join("finance.db");
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let storage =
        SqliteStorage::open(&path, &ConnectionConfig::default()).expect("open sqlite storage");
    let clock = Arc::new(FixedClock::at_date(today));
    let store = Arc::new(LedgerStore::new(Box::new(storage), clock.clone()));
    TestLedger { store, clock }
}

pub fn dialogue_for(ledger: &TestLedger) -> Dialogue {
    Dialogue::new(
        ledger.store.clone(),
        Arc::new(MemorySessionStore::new()),
        Config::default(),
    )
}

/// Backend that delegates to an in-memory database until `fail` is switched on, after which
/// every call reports an I/O fault.
pub struct FlakyBackend {
    inner: SqliteStorage,
    fail: Arc<AtomicBool>,
}

impl FlakyBackend {
    pub fn new() -> (Self, Arc<AtomicBool>) {
        let fail = Arc::new(AtomicBool::new(false));
        let backend = Self {
            inner: SqliteStorage::in_memory().expect("in-memory storage"),
            fail: fail.clone(),
        };
        (backend, fail)
    }

    fn guard(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(LedgerError::Io(std::io::Error::other("disk unavailable")));
        }
        Ok(())
    }
}

impl StorageBackend for FlakyBackend {
    fn ensure_schema(&self) -> Result<u32> {
        self.guard()?;
        self.inner.ensure_schema()
    }

    fn upsert_user(&self, user_id: i64, username: Option<&str>, now: NaiveDateTime) -> Result<()> {
        self.guard()?;
        self.inner.upsert_user(user_id, username, now)
    }

    fn user(&self, user_id: i64) -> Result<Option<User>> {
        self.guard()?;
        self.inner.user(user_id)
    }

    fn insert_transaction(
        &self,
        draft: &NewTransaction,
        date: NaiveDate,
        created_at: NaiveDateTime,
    ) -> Result<i64> {
        self.guard()?;
        self.inner.insert_transaction(draft, date, created_at)
    }

    fn transaction(&self, id: i64, user_id: i64) -> Result<Option<Transaction>> {
        self.guard()?;
        self.inner.transaction(id, user_id)
    }

    fn transactions(&self, user_id: i64, filter: TransactionFilter) -> Result<Vec<Transaction>> {
        self.guard()?;
        self.inner.transactions(user_id, filter)
    }

    fn recent_transactions(
        &self,
        user_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<TransactionPage> {
        self.guard()?;
        self.inner.recent_transactions(user_id, limit, offset)
    }

    fn balance(&self, user_id: i64) -> Result<Balance> {
        self.guard()?;
        self.inner.balance(user_id)
    }

    fn category_summary(
        &self,
        user_id: i64,
        range: DateRange,
        kind: TransactionKind,
    ) -> Result<Vec<CategoryTotal>> {
        self.guard()?;
        self.inner.category_summary(user_id, range, kind)
    }

    fn delete_transaction(&self, id: i64, user_id: i64) -> Result<bool> {
        self.guard()?;
        self.inner.delete_transaction(id, user_id)
    }

    fn upsert_budget(
        &self,
        user_id: i64,
        category: &str,
        limit: Decimal,
        period: BudgetPeriod,
        now: NaiveDateTime,
    ) -> Result<i64> {
        self.guard()?;
        self.inner.upsert_budget(user_id, category, limit, period, now)
    }

    fn budgets(&self, user_id: i64, period: Option<BudgetPeriod>) -> Result<Vec<Budget>> {
        self.guard()?;
        self.inner.budgets(user_id, period)
    }

    fn budget(&self, id: i64, user_id: i64) -> Result<Option<Budget>> {
        self.guard()?;
        self.inner.budget(id, user_id)
    }

    fn budget_spend(
        &self,
        user_id: i64,
        category: &str,
        period: BudgetPeriod,
        range: DateRange,
    ) -> Result<Option<BudgetSpend>> {
        self.guard()?;
        self.inner.budget_spend(user_id, category, period, range)
    }

    fn delete_budget(&self, id: i64, user_id: i64) -> Result<bool> {
        self.guard()?;
        self.inner.delete_budget(id, user_id)
    }
}

/// Ledger over a [`FlakyBackend`]; flip the returned flag to simulate storage faults.
pub fn flaky_ledger(today: NaiveDate) -> (TestLedger, Arc<AtomicBool>) {
    let (backend, fail) = FlakyBackend::new();
    let clock = Arc::new(FixedClock::at_date(today));
    let store = Arc::new(LedgerStore::new(Box::new(backend), clock.clone()));
    (TestLedger { store, clock }, fail)
}

pub fn expense(user_id: i64, amount: &str, category: &str, on: NaiveDate) -> NewTransaction {
    NewTransaction::expense(user_id, dec(amount), category).on(on)
}

pub fn income(user_id: i64, amount: &str, category: &str, on: NaiveDate) -> NewTransaction {
    NewTransaction::income(user_id, dec(amount), category).on(on)
}
