use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, error};

use crate::core::clock::Clock;
use crate::errors::{LedgerError, Result};
use crate::ledger::{
    money, Balance, Budget, BudgetPeriod, BudgetSpend, CategoryTotal, DateRange, NewTransaction,
    Transaction, TransactionKind,
};
use crate::storage::{StorageBackend, TransactionFilter, TransactionPage};

/// Facade over a [`StorageBackend`] that owns the ledger's failure policy.
///
/// Reads never fail: a backend fault is logged and the caller receives an empty or zero value.
/// Recording a brand-new transaction or budget is the exception and returns the fault, so the
/// user can be told the entry may not have been saved.
pub struct LedgerStore {
    backend: Box<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
}

impl LedgerStore {
    pub fn new(backend: Box<dyn StorageBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Registers the user on first contact. Existing rows are left untouched.
    pub fn upsert_user(&self, user_id: i64, username: Option<&str>) {
        if let Err(err) = self
            .backend
            .upsert_user(user_id, username, self.clock.now())
        {
            error!(user_id, %err, "failed to register user");
        }
    }

    /// Persists a new transaction, defaulting its date to today, and returns its id.
    pub fn add_transaction(&self, draft: &NewTransaction) -> Result<i64> {
        check_amount(draft.amount, "amount")?;
        let now = self.clock.now();
        let date = draft.date.unwrap_or_else(|| now.date());
        self.backend
            .insert_transaction(draft, date, now)
            .map_err(|err| {
                error!(user_id = draft.user_id, %err, "failed to record transaction");
                err
            })
    }

    pub fn get_transaction(&self, id: i64, user_id: i64) -> Option<Transaction> {
        self.backend
            .transaction(id, user_id)
            .unwrap_or_else(|err| degraded("get_transaction", user_id, err, None))
    }

    /// Transactions newest first, optionally bounded by date range and kind.
    pub fn list_transactions(
        &self,
        user_id: i64,
        range: Option<DateRange>,
        kind: Option<TransactionKind>,
    ) -> Vec<Transaction> {
        self.backend
            .transactions(user_id, TransactionFilter { range, kind })
            .unwrap_or_else(|err| degraded("list_transactions", user_id, err, Vec::new()))
    }

    pub fn list_recent(&self, user_id: i64, limit: u32, offset: u32) -> TransactionPage {
        self.backend
            .recent_transactions(user_id, limit, offset)
            .unwrap_or_else(|err| degraded("list_recent", user_id, err, TransactionPage::default()))
    }

    pub fn balance(&self, user_id: i64) -> Balance {
        self.backend
            .balance(user_id)
            .unwrap_or_else(|err| degraded("balance", user_id, err, Balance::default()))
    }

    pub fn category_summary(
        &self,
        user_id: i64,
        range: DateRange,
        kind: TransactionKind,
    ) -> Vec<CategoryTotal> {
        self.backend
            .category_summary(user_id, range, kind)
            .unwrap_or_else(|err| degraded("category_summary", user_id, err, Vec::new()))
    }

    /// Deletes a transaction owned by `user_id`. Foreign or unknown ids yield `false`.
    pub fn delete_transaction(&self, id: i64, user_id: i64) -> bool {
        let removed = self
            .backend
            .delete_transaction(id, user_id)
            .unwrap_or_else(|err| degraded("delete_transaction", user_id, err, false));
        debug!(id, user_id, removed, "delete transaction");
        removed
    }

    /// Creates or replaces the budget for `(user, category, period)` and returns its id.
    pub fn set_budget(
        &self,
        user_id: i64,
        category: &str,
        limit: Decimal,
        period: BudgetPeriod,
    ) -> Result<i64> {
        check_amount(limit, "budget limit")?;
        self.backend
            .upsert_budget(user_id, category, limit, period, self.clock.now())
            .map_err(|err| {
                error!(user_id, category, %err, "failed to store budget");
                err
            })
    }

    pub fn list_budgets(&self, user_id: i64, period: Option<BudgetPeriod>) -> Vec<Budget> {
        self.backend
            .budgets(user_id, period)
            .unwrap_or_else(|err| degraded("list_budgets", user_id, err, Vec::new()))
    }

    pub fn get_budget(&self, id: i64, user_id: i64) -> Option<Budget> {
        self.backend
            .budget(id, user_id)
            .unwrap_or_else(|err| degraded("get_budget", user_id, err, None))
    }

    /// Limit and in-range spend for a configured budget; `None` when no such budget exists.
    pub fn budget_spend(
        &self,
        user_id: i64,
        category: &str,
        period: BudgetPeriod,
        range: DateRange,
    ) -> Option<BudgetSpend> {
        self.backend
            .budget_spend(user_id, category, period, range)
            .unwrap_or_else(|err| degraded("budget_spend", user_id, err, None))
    }

    pub fn delete_budget(&self, id: i64, user_id: i64) -> bool {
        let removed = self
            .backend
            .delete_budget(id, user_id)
            .unwrap_or_else(|err| degraded("delete_budget", user_id, err, false));
        debug!(id, user_id, removed, "delete budget");
        removed
    }
}

/// Amounts must be positive and already expressed in whole cents.
fn check_amount(amount: Decimal, what: &str) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "{what} must be greater than zero"
        )));
    }
    if money::normalize(amount) != amount {
        return Err(LedgerError::Validation(format!(
            "{what} has more than {} decimal places",
            money::AMOUNT_SCALE
        )));
    }
    Ok(())
}

fn degraded<T>(operation: &'static str, user_id: i64, err: LedgerError, fallback: T) -> T {
    error!(operation, user_id, %err, "ledger read failed; returning empty result");
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::storage::SqliteStorage;

    fn store_on(day: NaiveDate) -> LedgerStore {
        LedgerStore::new(
            Box::new(SqliteStorage::in_memory().unwrap()),
            Arc::new(FixedClock::at_date(day)),
        )
    }

    #[test]
    fn missing_date_defaults_to_clock_today() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 9).unwrap();
        let store = store_on(today);
        let id = store
            .add_transaction(&NewTransaction::expense(1, Decimal::from(20), "Food"))
            .unwrap();
        let stored = store.get_transaction(id, 1).unwrap();
        assert_eq!(stored.date, today);
        assert_eq!(stored.created_at.date(), today);
    }

    #[test]
    fn non_positive_amounts_are_rejected_before_storage() {
        let store = store_on(NaiveDate::from_ymd_opt(2025, 4, 9).unwrap());
        let err = store
            .add_transaction(&NewTransaction::income(1, Decimal::ZERO, "Salary"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(store.list_transactions(1, None, None).is_empty());
    }

    #[test]
    fn sub_cent_amounts_are_validation_errors() {
        let store = store_on(NaiveDate::from_ymd_opt(2025, 4, 9).unwrap());
        for raw in ["0.004", "1.005"] {
            let amount: Decimal = raw.parse().unwrap();
            let err = store
                .add_transaction(&NewTransaction::expense(1, amount, "Food"))
                .unwrap_err();
            assert!(matches!(err, LedgerError::Validation(_)), "{raw}: {err}");
            let err = store
                .set_budget(1, "Food", amount, BudgetPeriod::Month)
                .unwrap_err();
            assert!(matches!(err, LedgerError::Validation(_)), "{raw}: {err}");
        }
        assert!(store.list_transactions(1, None, None).is_empty());
        assert!(store.list_budgets(1, None).is_empty());

        let trailing_zeros: Decimal = "1.500".parse().unwrap();
        let id = store
            .add_transaction(&NewTransaction::expense(1, trailing_zeros, "Food"))
            .unwrap();
        assert_eq!(store.get_transaction(id, 1).unwrap().amount, Decimal::new(150, 2));
    }

    #[test]
    fn deleting_someone_elses_transaction_is_a_no_op() {
        let store = store_on(NaiveDate::from_ymd_opt(2025, 4, 9).unwrap());
        let id = store
            .add_transaction(&NewTransaction::expense(1, Decimal::from(5), "Food"))
            .unwrap();
        assert!(!store.delete_transaction(id, 2));
        assert!(store.get_transaction(id, 1).is_some());
        assert!(store.delete_transaction(id, 1));
        assert!(!store.delete_transaction(id, 1));
    }
}
