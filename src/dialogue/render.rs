//! Message texts. Amounts are always shown with two fraction digits and the currency label.

use std::fmt::Write as _;

use rust_decimal::Decimal;

use crate::core::services::{
    BudgetAlert, BudgetAlertLevel, BudgetOverviewLine, DynamicsChart, HistoryPage, PeriodReport,
    PieChart, RecordOutcome,
};
use crate::ledger::{money, Balance, BudgetPeriod, CategoryTotal, Transaction, TransactionKind};

const RULE: &str = "━━━━━━━━━━━━━━━━━━";

/// Formats amounts with a fixed currency label.
#[derive(Debug, Clone)]
pub struct Renderer {
    currency: String,
}

impl Renderer {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }

    pub fn amount(&self, amount: Decimal) -> String {
        format!("{} {}", money::format_amount(amount), self.currency)
    }

    fn signed(&self, kind: TransactionKind, amount: Decimal) -> String {
        let sign = match kind {
            TransactionKind::Income => '+',
            TransactionKind::Expense => '-',
        };
        format!("{sign}{}", self.amount(amount))
    }

    pub fn welcome(&self, name: Option<&str>) -> String {
        let greeting = name.map_or_else(|| "Hello!".to_string(), |n| format!("Hello, {n}!"));
        format!(
            "{greeting}\n\nI keep track of your income, expenses and budgets.\nChoose an action below."
        )
    }

    pub fn help(&self) -> String {
        [
            "Available commands:",
            "/start - main menu",
            "/menu - main menu",
            "/balance - current balance",
            "/cancel - abort the current step",
            "/del_<id> - delete a transaction",
            "/del_budget_<id> - delete a budget",
        ]
        .join("\n")
    }

    pub fn balance(&self, balance: &Balance) -> String {
        let marker = if balance.net >= Decimal::ZERO { "💚" } else { "❤️" };
        format!(
            "{marker} Your balance\n\n📊 {}\n\n{RULE}\n📈 Income: +{}\n📉 Expenses: -{}\n{RULE}",
            self.amount(balance.net),
            self.amount(balance.income),
            self.amount(balance.expense),
        )
    }

    pub fn report(&self, report: &PeriodReport) -> String {
        let mut text = format!("📊 Report: {}\n{}\n\n", report.label, report.range);
        let _ = writeln!(text, "💳 Overall balance: {}", self.amount(report.balance.net));
        let _ = writeln!(text, "📈 Total income: +{}", self.amount(report.balance.income));
        let _ = writeln!(text, "📉 Total expenses: -{}\n", self.amount(report.balance.expense));
        if report.is_empty() {
            text.push_str("No transactions in this period.\n\n");
        } else {
            let _ = writeln!(text, "{RULE}\nIn this period:");
            let _ = writeln!(text, "➕ Income: +{}", self.amount(report.period.income));
            let _ = writeln!(text, "➖ Expenses: -{}", self.amount(report.period.expense));
            let _ = writeln!(text, "💰 Period net: {}\n", self.amount(report.period.net));
            self.category_section(&mut text, "Expenses by category", &report.expense_by_category);
            self.category_section(&mut text, "Income by category", &report.income_by_category);
        }
        let _ = write!(text, "{RULE}\n🧾 Transactions in period: {}", report.transaction_count());
        text
    }

    fn category_section(&self, text: &mut String, title: &str, totals: &[CategoryTotal]) {
        if totals.is_empty() {
            return;
        }
        let _ = writeln!(text, "{title}:");
        for entry in totals {
            let _ = writeln!(
                text,
                "  • {}: {} ({} tx)",
                entry.category,
                self.amount(entry.total),
                entry.count
            );
        }
        text.push('\n');
    }

    pub fn category_prompt(&self, kind: TransactionKind) -> String {
        match kind {
            TransactionKind::Expense => "💸 Add expense\n\nChoose a category:".to_string(),
            TransactionKind::Income => "💰 Add income\n\nChoose a category:".to_string(),
        }
    }

    pub fn date_prompt(&self, kind: TransactionKind, category: &str) -> String {
        format!(
            "{}\n\n📁 Category: {category}\n\nWhen did it happen?",
            kind_title(kind)
        )
    }

    pub fn amount_prompt(&self, kind: TransactionKind, category: &str, date: chrono::NaiveDate) -> String {
        format!(
            "{}\n\n📁 Category: {category}\n📅 Date: {date}\n\n💵 Enter the amount:",
            kind_title(kind)
        )
    }

    pub fn invalid_amount(&self, reason: &str, max: Decimal) -> String {
        format!(
            "⚠️ Invalid amount: {reason}.\nExamples: 150, 99.99, 1 250,50\nMaximum: {}",
            self.amount(max)
        )
    }

    pub fn description_prompt(&self) -> String {
        "📝 Add a description, or send \"-\" to skip:".to_string()
    }

    pub fn recorded(
        &self,
        kind: TransactionKind,
        category: &str,
        amount: Decimal,
        description: Option<&str>,
        outcome: &RecordOutcome,
    ) -> String {
        format!(
            "✅ {} saved!\n\n📁 Category: {category}\n💵 Amount: {}\n📝 Description: {}\n\n{RULE}\n💰 New balance: {}",
            kind.display_name(),
            self.amount(amount),
            description.unwrap_or("not set"),
            self.amount(outcome.balance.net),
        )
    }

    pub fn save_failed(&self) -> String {
        "⚠️ The record may not have been saved. Please try again later; your input is kept.".to_string()
    }

    pub fn budget_alert(&self, alert: &BudgetAlert) -> String {
        match alert.level {
            BudgetAlertLevel::Exceeded => format!(
                "🔴 Budget exceeded for {}!\nSpent {} of {} ({:.1}%).",
                alert.category,
                self.amount(alert.spent),
                self.amount(alert.limit),
                alert.percentage
            ),
            BudgetAlertLevel::Approaching => format!(
                "🟡 {:.1}% of the {} budget used.\nSpent {} of {}.",
                alert.percentage,
                alert.category,
                self.amount(alert.spent),
                self.amount(alert.limit)
            ),
        }
    }

    pub fn history(&self, page: &HistoryPage) -> String {
        if page.transactions.is_empty() {
            return "📝 No transactions yet.".to_string();
        }
        let mut text = format!(
            "📝 Transaction history\nPage {} of {} (total: {})\n\n",
            page.page, page.total_pages, page.total_count
        );
        for txn in &page.transactions {
            self.history_entry(&mut text, txn);
        }
        text
    }

    fn history_entry(&self, text: &mut String, txn: &Transaction) {
        let marker = match txn.kind {
            TransactionKind::Expense => "📉",
            TransactionKind::Income => "📈",
        };
        let _ = writeln!(text, "{marker} {}", txn.category);
        let _ = writeln!(text, "   💵 {}", self.signed(txn.kind, txn.amount));
        let _ = writeln!(text, "   📅 {}", txn.date);
        if let Some(description) = &txn.description {
            let _ = writeln!(text, "   📝 {description}");
        }
        let _ = writeln!(text, "   [ID: {}] /del_{}\n", txn.id, txn.id);
    }

    pub fn budget_overview(&self, lines: &[BudgetOverviewLine]) -> String {
        if lines.is_empty() {
            return "You have no budgets yet.\n\nSet one to keep spending under control!".to_string();
        }
        let mut text = String::from("🎯 Your budgets:\n\n");
        for line in lines {
            let _ = writeln!(text, "{} {}", line.status.marker(), line.budget.category);
            let _ = writeln!(
                text,
                "   Budget: {} ({})",
                self.amount(line.budget.limit),
                period_name(line.budget.period)
            );
            let _ = writeln!(
                text,
                "   Spent: {} ({:.1}%)",
                self.amount(line.spent),
                line.percentage
            );
            let _ = writeln!(text, "   Remaining: {}\n", self.amount(line.remaining));
        }
        text
    }

    pub fn budget_saved(&self, category: &str, period: BudgetPeriod, limit: Decimal) -> String {
        format!(
            "✅ Budget set!\n\n📁 Category: {category}\n📅 Period: {}\n💵 Limit: {}",
            period.display_name(),
            self.amount(limit)
        )
    }

    pub fn pie(&self, chart: &PieChart) -> String {
        let mut text = format!(
            "🥧 {} by category, {}\nTotal: {}\n\n",
            match chart.kind {
                TransactionKind::Expense => "Expenses",
                TransactionKind::Income => "Income",
            },
            chart.range,
            self.amount(chart.total)
        );
        for slice in &chart.slices {
            let _ = writeln!(
                text,
                "  • {}: {} ({:.1}%)",
                slice.category,
                self.amount(slice.total),
                slice.share
            );
        }
        text
    }

    pub fn dynamics(&self, chart: &DynamicsChart) -> String {
        let mut text = format!("📊 Monthly dynamics, {}\n\n", chart.range);
        for point in &chart.points {
            let _ = writeln!(
                text,
                "{}  +{}  -{}",
                point.label(),
                self.amount(point.income),
                self.amount(point.expense)
            );
        }
        let _ = write!(
            text,
            "\nTotal income: {}\nTotal expenses: {}",
            self.amount(chart.total_income()),
            self.amount(chart.total_expense())
        );
        text
    }
}

fn kind_title(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "💸 Expense",
        TransactionKind::Income => "💰 Income",
    }
}

fn period_name(period: BudgetPeriod) -> &'static str {
    match period {
        BudgetPeriod::Month => "month",
        BudgetPeriod::Year => "year",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_shows_signed_parts() {
        let renderer = Renderer::new("UAH");
        let text = renderer.balance(&Balance::from_totals(Decimal::ZERO, Decimal::from(150)));
        assert!(text.contains("❤️"));
        assert!(text.contains("📊 -150.00 UAH"));
        assert!(text.contains("Expenses: -150.00 UAH"));
    }

    #[test]
    fn report_shows_lifetime_totals_and_period_count() {
        let renderer = Renderer::new("UAH");
        let range = crate::ledger::DateRange::single(
            chrono::NaiveDate::from_ymd_opt(2025, 5, 20).unwrap(),
        );
        let report = PeriodReport {
            label: "Today".into(),
            range,
            balance: Balance::from_totals(Decimal::from(1000), Decimal::from(400)),
            period: Balance::from_totals(Decimal::ZERO, Decimal::from(150)),
            income_by_category: Vec::new(),
            expense_by_category: vec![
                CategoryTotal {
                    category: "Food".into(),
                    total: Decimal::from(100),
                    count: 2,
                },
                CategoryTotal {
                    category: "Cafe".into(),
                    total: Decimal::from(50),
                    count: 1,
                },
            ],
        };
        let text = renderer.report(&report);
        assert!(text.contains("Overall balance: 600.00 UAH"));
        assert!(text.contains("Total income: +1,000.00 UAH"));
        assert!(text.contains("Total expenses: -400.00 UAH"));
        assert!(text.contains("Food: 100.00 UAH (2 tx)"));
        assert!(text.ends_with("Transactions in period: 3"));
    }

    #[test]
    fn empty_history_has_placeholder() {
        let renderer = Renderer::new("UAH");
        let page = HistoryPage {
            page: 1,
            total_pages: 0,
            total_count: 0,
            transactions: Vec::new(),
        };
        assert_eq!(renderer.history(&page), "📝 No transactions yet.");
    }
}
