//! Data behind the pie and dynamics charts. Rendering to an image is left to the front end.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::ledger_store::LedgerStore;
use crate::core::period::{self, PeriodToken};
use crate::ledger::{money, DateRange, TransactionKind};

use super::report_service::{MonthlyPoint, ReportService};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PieSlice {
    pub category: String,
    pub total: Decimal,
    /// Share of the chart total, in percent, rounded to two places.
    pub share: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PieChart {
    pub kind: TransactionKind,
    pub range: DateRange,
    pub total: Decimal,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DynamicsChart {
    pub range: DateRange,
    pub points: Vec<MonthlyPoint>,
}

impl DynamicsChart {
    pub fn total_income(&self) -> Decimal {
        self.points.iter().map(|p| p.income).sum()
    }

    pub fn total_expense(&self) -> Decimal {
        self.points.iter().map(|p| p.expense).sum()
    }
}

pub struct ChartService;

impl ChartService {
    /// Category shares of one kind over the rolling 30-day window; `None` without data.
    pub fn category_pie(store: &LedgerStore, user_id: i64, kind: TransactionKind) -> Option<PieChart> {
        let range = period::resolve_rolling(PeriodToken::Month, store.today()).range;
        let totals = ReportService::category_breakdown(store, user_id, kind, range);
        let total: Decimal = totals.iter().map(|entry| entry.total).sum();
        if totals.is_empty() || total.is_zero() {
            return None;
        }
        let slices = totals
            .into_iter()
            .map(|entry| PieSlice {
                share: money::percentage(entry.total, total)
                    .map(money::normalize)
                    .unwrap_or_default(),
                category: entry.category,
                total: entry.total,
            })
            .collect();
        Some(PieChart {
            kind,
            range,
            total,
            slices,
        })
    }

    /// Monthly income against expense over the rolling 365-day window; `None` without data.
    pub fn yearly_dynamics(store: &LedgerStore, user_id: i64) -> Option<DynamicsChart> {
        let range = period::resolve_rolling(PeriodToken::Year, store.today()).range;
        let points = ReportService::monthly_series(store, user_id, range);
        if points.is_empty() {
            return None;
        }
        Some(DynamicsChart { range, points })
    }
}
