//! Aggregations derived on demand from the ledger; nothing here is cached.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::ledger_store::LedgerStore;
use crate::core::period::ResolvedPeriod;
use crate::ledger::{date_range, Balance, CategoryTotal, DateRange, TransactionKind};

/// Lifetime balance next to the activity of one period.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PeriodReport {
    pub label: String,
    pub range: DateRange,
    /// All-time position, independent of `range`.
    pub balance: Balance,
    /// Income, expense, and net within `range`.
    pub period: Balance,
    pub income_by_category: Vec<CategoryTotal>,
    pub expense_by_category: Vec<CategoryTotal>,
}

impl PeriodReport {
    pub fn is_empty(&self) -> bool {
        self.income_by_category.is_empty() && self.expense_by_category.is_empty()
    }

    /// Number of transactions inside `range`.
    pub fn transaction_count(&self) -> u32 {
        self.income_by_category
            .iter()
            .chain(&self.expense_by_category)
            .map(|entry| entry.count)
            .sum()
    }
}

/// Income and expense sums of one calendar month.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MonthlyPoint {
    /// First day of the month.
    pub month: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
}

impl MonthlyPoint {
    fn empty(month: NaiveDate) -> Self {
        Self {
            month,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
        }
    }

    pub fn label(&self) -> String {
        self.month.format("%m.%Y").to_string()
    }
}

pub struct ReportService;

impl ReportService {
    pub fn period_report(
        store: &LedgerStore,
        user_id: i64,
        range: DateRange,
        label: impl Into<String>,
    ) -> PeriodReport {
        let income_by_category = store.category_summary(user_id, range, TransactionKind::Income);
        let expense_by_category = store.category_summary(user_id, range, TransactionKind::Expense);
        PeriodReport {
            label: label.into(),
            range,
            balance: store.balance(user_id),
            period: Balance::from_totals(
                sum_totals(&income_by_category),
                sum_totals(&expense_by_category),
            ),
            income_by_category,
            expense_by_category,
        }
    }

    /// Report for a resolved period token.
    pub fn resolved_report(
        store: &LedgerStore,
        user_id: i64,
        period: &ResolvedPeriod,
    ) -> PeriodReport {
        Self::period_report(store, user_id, period.range, period.label)
    }

    /// Dense per-month series from the earliest to the latest transaction month in `range`.
    ///
    /// Months without transactions appear with zero sums. Empty when `range` holds no
    /// transactions.
    pub fn monthly_series(store: &LedgerStore, user_id: i64, range: DateRange) -> Vec<MonthlyPoint> {
        let transactions = store.list_transactions(user_id, Some(range), None);
        let (Some(first), Some(last)) = (
            transactions.iter().map(|t| t.date).min(),
            transactions.iter().map(|t| t.date).max(),
        ) else {
            return Vec::new();
        };

        let mut points = Vec::new();
        let mut month = date_range::month_start(first);
        let last_month = date_range::month_start(last);
        while month <= last_month {
            points.push(MonthlyPoint::empty(month));
            month = date_range::next_month_start(month);
        }

        for txn in &transactions {
            let index = month_index(points[0].month, txn.date);
            if let Some(point) = points.get_mut(index) {
                match txn.kind {
                    TransactionKind::Income => point.income += txn.amount,
                    TransactionKind::Expense => point.expense += txn.amount,
                }
            }
        }
        points
    }

    /// Category totals of one kind; empty means there is not enough data to plot.
    pub fn category_breakdown(
        store: &LedgerStore,
        user_id: i64,
        kind: TransactionKind,
        range: DateRange,
    ) -> Vec<CategoryTotal> {
        store.category_summary(user_id, range, kind)
    }
}

fn sum_totals(totals: &[CategoryTotal]) -> Decimal {
    totals.iter().map(|entry| entry.total).sum()
}

fn month_index(origin: NaiveDate, date: NaiveDate) -> usize {
    let months = (date.year() - origin.year()) * 12 + date.month() as i32 - origin.month() as i32;
    usize::try_from(months).unwrap_or(usize::MAX)
}
