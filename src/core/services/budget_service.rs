//! Budget threshold evaluation and the per-budget overview.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::core::ledger_store::LedgerStore;
use crate::core::period;
use crate::ledger::{money, Budget, BudgetPeriod, BudgetSpend, DateRange};

/// Percentage at which a budget starts warning.
pub const WARNING_THRESHOLD: Decimal = Decimal::from_parts(80, 0, 0, false, 0);
/// Percentage at which a budget counts as exceeded.
pub const EXCEEDED_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BudgetAlertLevel {
    Approaching,
    Exceeded,
}

/// Notification raised after an expense pushes a monthly budget past a threshold.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BudgetAlert {
    pub category: String,
    pub level: BudgetAlertLevel,
    pub limit: Decimal,
    pub spent: Decimal,
    pub percentage: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OnTrack,
    Warning,
    Exceeded,
}

impl BudgetStatus {
    pub fn from_percentage(percentage: Decimal) -> Self {
        if percentage >= EXCEEDED_THRESHOLD {
            BudgetStatus::Exceeded
        } else if percentage >= WARNING_THRESHOLD {
            BudgetStatus::Warning
        } else {
            BudgetStatus::OnTrack
        }
    }

    pub fn marker(self) -> &'static str {
        match self {
            BudgetStatus::OnTrack => "🟢",
            BudgetStatus::Warning => "🟡",
            BudgetStatus::Exceeded => "🔴",
        }
    }
}

/// One row of the budget listing view.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BudgetOverviewLine {
    pub budget: Budget,
    pub window: DateRange,
    pub spent: Decimal,
    pub percentage: Decimal,
    pub remaining: Decimal,
    pub status: BudgetStatus,
}

pub struct BudgetService;

impl BudgetService {
    /// Classifies a limit/spend pair. A zero limit never alerts.
    pub fn classify(spend: BudgetSpend) -> Option<(BudgetAlertLevel, Decimal)> {
        let percentage = money::percentage(spend.spent, spend.limit)?;
        if percentage >= EXCEEDED_THRESHOLD {
            Some((BudgetAlertLevel::Exceeded, percentage))
        } else if percentage >= WARNING_THRESHOLD {
            Some((BudgetAlertLevel::Approaching, percentage))
        } else {
            None
        }
    }

    /// Checks the monthly budget of `category` against calendar month-to-date spend.
    ///
    /// Fires on every call while a threshold is crossed; no suppression state is kept.
    pub fn evaluate(store: &LedgerStore, user_id: i64, category: &str) -> Option<BudgetAlert> {
        let window = period::calendar_month_to_date(store.today());
        let spend = store.budget_spend(user_id, category, BudgetPeriod::Month, window)?;
        let (level, percentage) = Self::classify(spend)?;
        warn!(user_id, category, ?level, %percentage, "budget threshold crossed");
        Some(BudgetAlert {
            category: category.to_string(),
            level,
            limit: spend.limit,
            spent: spend.spent,
            percentage,
        })
    }

    /// All budgets of the user with spend over their calendar window.
    pub fn overview(store: &LedgerStore, user_id: i64) -> Vec<BudgetOverviewLine> {
        let today = store.today();
        store
            .list_budgets(user_id, None)
            .into_iter()
            .map(|budget| {
                let window = period::budget_window(budget.period, today);
                let spent = store
                    .budget_spend(user_id, &budget.category, budget.period, window)
                    .map(|spend| spend.spent)
                    .unwrap_or_default();
                let percentage = money::percentage(spent, budget.limit).unwrap_or_default();
                let remaining = (budget.limit - spent).max(Decimal::ZERO);
                BudgetOverviewLine {
                    window,
                    spent,
                    percentage,
                    remaining,
                    status: BudgetStatus::from_percentage(percentage),
                    budget,
                }
            })
            .collect()
    }
}
