//! Button layouts attached to outbound messages.

use crate::core::period::PeriodToken;
use crate::core::services::ExportFormat;
use crate::ledger::{Budget, BudgetPeriod, Transaction, TransactionKind};

use super::command::{ChartRequest, Command, DateChoice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub command: Command,
}

impl Button {
    pub fn new(label: impl Into<String>, command: Command) -> Self {
        Self {
            label: label.into(),
            command,
        }
    }

    /// Payload sent back when the button is pressed.
    pub fn data(&self) -> String {
        self.command.callback_data().unwrap_or_default()
    }
}

/// Rows of buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    pub rows: Vec<Vec<Button>>,
}

impl Menu {
    pub fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    /// Finds a button by its payload.
    pub fn find(&self, data: &str) -> Option<&Button> {
        self.buttons().find(|button| button.data() == data)
    }
}

fn home() -> Button {
    Button::new("🏠 Main menu", Command::BackMain)
}

fn cancel() -> Button {
    Button::new("✖️ Cancel", Command::Cancel)
}

pub fn main_menu() -> Menu {
    Menu::new(vec![
        vec![
            Button::new("💸 Add expense", Command::AddExpense),
            Button::new("💰 Add income", Command::AddIncome),
        ],
        vec![Button::new("⚡ Quick expense", Command::QuickExpense)],
        vec![
            Button::new("📊 Reports", Command::Reports),
            Button::new("💳 Balance", Command::Balance),
        ],
        vec![
            Button::new("📝 History", Command::ViewHistory),
            Button::new("🎯 Budgets", Command::Budgets),
        ],
        vec![
            Button::new("📈 Charts", Command::Charts),
            Button::new("📤 Export", Command::Export),
        ],
    ])
}

pub fn quick_expense_menu(categories: &[String]) -> Menu {
    let mut rows: Vec<Vec<Button>> = categories
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|category| {
                    Button::new(
                        category.clone(),
                        Command::QuickCategory {
                            kind: TransactionKind::Expense,
                            category: category.clone(),
                        },
                    )
                })
                .collect()
        })
        .collect();
    rows.push(vec![
        Button::new("📋 Other categories", Command::AddExpense),
        home(),
    ]);
    Menu::new(rows)
}

/// Two categories per row followed by a cancel button.
pub fn category_menu(kind: TransactionKind, categories: &[String]) -> Menu {
    let mut rows: Vec<Vec<Button>> = categories
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|category| {
                    Button::new(
                        category.clone(),
                        Command::Category {
                            kind,
                            category: category.clone(),
                        },
                    )
                })
                .collect()
        })
        .collect();
    rows.push(vec![cancel()]);
    Menu::new(rows)
}

pub fn date_menu() -> Menu {
    Menu::new(vec![
        vec![
            Button::new("Today", Command::TransactionDate(DateChoice::Today)),
            Button::new("Yesterday", Command::TransactionDate(DateChoice::Yesterday)),
        ],
        vec![Button::new("Skip (today)", Command::TransactionDate(DateChoice::Skip))],
        vec![cancel()],
    ])
}

pub fn cancel_menu() -> Menu {
    Menu::new(vec![vec![cancel()]])
}

pub fn back_menu() -> Menu {
    Menu::new(vec![vec![home()]])
}

pub fn reports_menu() -> Menu {
    let report = |label: &str, token| Button::new(label, Command::Report(token));
    Menu::new(vec![
        vec![report("Today", PeriodToken::Today)],
        vec![
            report("Yesterday", PeriodToken::Yesterday),
            report("Week", PeriodToken::Week),
            report("Month", PeriodToken::Month),
        ],
        vec![
            report("📊 Year", PeriodToken::Year),
            report("🔍 All time", PeriodToken::All),
        ],
        vec![Button::new("📈 Charts", Command::Charts), home()],
    ])
}

pub fn charts_menu() -> Menu {
    Menu::new(vec![
        vec![Button::new(
            "🥧 Expenses by category",
            Command::Chart(ChartRequest::ExpensePie),
        )],
        vec![Button::new(
            "🥧 Income by category",
            Command::Chart(ChartRequest::IncomePie),
        )],
        vec![Button::new(
            "📊 Yearly dynamics",
            Command::Chart(ChartRequest::YearlyDynamics),
        )],
        vec![Button::new("◀️ Reports", Command::Reports), home()],
    ])
}

pub fn export_menu() -> Menu {
    Menu::new(vec![
        vec![
            Button::new("📄 CSV", Command::ExportAs(ExportFormat::Csv)),
            Button::new("🧾 JSON", Command::ExportAs(ExportFormat::Json)),
        ],
        vec![home()],
    ])
}

pub fn budget_menu() -> Menu {
    Menu::new(vec![
        vec![Button::new("➕ New budget", Command::SetBudget)],
        vec![Button::new("📋 My budgets", Command::ViewBudgets)],
        vec![home()],
    ])
}

pub fn budget_period_menu() -> Menu {
    Menu::new(vec![
        vec![
            Button::new("📅 Month", Command::ChooseBudgetPeriod(BudgetPeriod::Month)),
            Button::new("📅 Year", Command::ChooseBudgetPeriod(BudgetPeriod::Year)),
        ],
        vec![cancel()],
    ])
}

pub fn budget_list_menu(budgets: &[Budget]) -> Menu {
    let mut rows: Vec<Vec<Button>> = budgets
        .iter()
        .map(|budget| {
            vec![
                Button::new(
                    format!("✏️ Edit {}", budget.category),
                    Command::EditBudget(budget.id),
                ),
                Button::new(
                    format!("🗑 Delete {}", budget.category),
                    Command::DeleteBudget(budget.id),
                ),
            ]
        })
        .collect();
    rows.push(vec![Button::new("➕ New budget", Command::SetBudget)]);
    rows.push(vec![Button::new("◀️ Back", Command::Budgets), home()]);
    Menu::new(rows)
}

pub fn balance_actions_menu() -> Menu {
    Menu::new(vec![
        vec![
            Button::new("💸 Expense", Command::AddExpense),
            Button::new("💰 Income", Command::AddIncome),
        ],
        vec![
            Button::new("📝 History", Command::ViewHistory),
            Button::new("📊 Report", Command::Report(PeriodToken::Month)),
        ],
        vec![Button::new("📈 Charts", Command::Charts), home()],
    ])
}

pub fn transaction_success_menu() -> Menu {
    Menu::new(vec![
        vec![
            Button::new("➕ Another expense", Command::AddExpense),
            Button::new("💰 Income", Command::AddIncome),
        ],
        vec![
            Button::new("📊 Balance", Command::Balance),
            Button::new("📝 History", Command::ViewHistory),
        ],
        vec![home()],
    ])
}

pub fn confirm_delete_transaction_menu(id: i64, page: u32) -> Menu {
    Menu::new(vec![vec![
        Button::new("Yes, delete", Command::ConfirmDeleteTransaction(id)),
        Button::new("No, keep it", Command::CancelDeleteTransaction { page }),
    ]])
}

pub fn confirm_delete_budget_menu(id: i64) -> Menu {
    Menu::new(vec![vec![
        Button::new("Yes, delete", Command::ConfirmDeleteBudget(id)),
        Button::new("No, keep it", Command::CancelDeleteBudget),
    ]])
}

/// Delete buttons for the listed transactions plus page navigation.
pub fn history_menu(page: u32, total_pages: u32, transactions: &[Transaction]) -> Menu {
    let mut rows: Vec<Vec<Button>> = transactions
        .iter()
        .map(|txn| {
            vec![Button::new(
                format!("🗑 Delete ID:{}", txn.id),
                Command::DeleteTransaction { id: txn.id, page },
            )]
        })
        .collect();
    let mut nav = Vec::new();
    if page > 1 {
        nav.push(Button::new("◀️", Command::HistoryPage(page - 1)));
    }
    nav.push(Button::new(format!("{page}/{total_pages}"), Command::HistoryInfo));
    if page < total_pages {
        nav.push(Button::new("▶️", Command::HistoryPage(page + 1)));
    }
    rows.push(nav);
    rows.push(vec![home()]);
    Menu::new(rows)
}
