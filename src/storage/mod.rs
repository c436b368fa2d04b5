pub mod sqlite;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::errors::Result;
use crate::ledger::{
    Balance, Budget, BudgetPeriod, BudgetSpend, CategoryTotal, DateRange, NewTransaction,
    Transaction, TransactionKind, User,
};

/// Optional filters applied to a transaction listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub range: Option<DateRange>,
    pub kind: Option<TransactionKind>,
}

impl TransactionFilter {
    pub fn within(range: DateRange) -> Self {
        Self {
            range: Some(range),
            kind: None,
        }
    }

    pub fn of_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// One page of the newest transactions plus the user's total transaction count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub total_count: u64,
}

/// Abstraction over persistence backends. Every method is one atomic unit of work and reports
/// failures as errors; degrading policy lives in [`crate::core::ledger_store::LedgerStore`].
pub trait StorageBackend: Send + Sync {
    fn ensure_schema(&self) -> Result<u32>;

    fn upsert_user(&self, user_id: i64, username: Option<&str>, now: NaiveDateTime) -> Result<()>;
    fn user(&self, user_id: i64) -> Result<Option<User>>;

    fn insert_transaction(
        &self,
        draft: &NewTransaction,
        date: NaiveDate,
        created_at: NaiveDateTime,
    ) -> Result<i64>;
    fn transaction(&self, id: i64, user_id: i64) -> Result<Option<Transaction>>;
    fn transactions(&self, user_id: i64, filter: TransactionFilter) -> Result<Vec<Transaction>>;
    fn recent_transactions(&self, user_id: i64, limit: u32, offset: u32)
        -> Result<TransactionPage>;
    fn balance(&self, user_id: i64) -> Result<Balance>;
    fn category_summary(
        &self,
        user_id: i64,
        range: DateRange,
        kind: TransactionKind,
    ) -> Result<Vec<CategoryTotal>>;
    fn delete_transaction(&self, id: i64, user_id: i64) -> Result<bool>;

    fn upsert_budget(
        &self,
        user_id: i64,
        category: &str,
        limit: Decimal,
        period: BudgetPeriod,
        now: NaiveDateTime,
    ) -> Result<i64>;
    fn budgets(&self, user_id: i64, period: Option<BudgetPeriod>) -> Result<Vec<Budget>>;
    fn budget(&self, id: i64, user_id: i64) -> Result<Option<Budget>>;
    fn budget_spend(
        &self,
        user_id: i64,
        category: &str,
        period: BudgetPeriod,
        range: DateRange,
    ) -> Result<Option<BudgetSpend>>;
    fn delete_budget(&self, id: i64, user_id: i64) -> Result<bool>;
}

pub use sqlite::{ConnectionConfig, SqliteStorage};
