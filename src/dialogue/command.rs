//! Inbound button presses and messages, parsed once into a tagged command.

use std::str::FromStr;

use crate::core::period::PeriodToken;
use crate::core::services::ExportFormat;
use crate::ledger::{BudgetPeriod, TransactionKind};

/// Which day a transaction being entered is booked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateChoice {
    Today,
    Yesterday,
    /// Accept the default, which is today.
    Skip,
}

impl DateChoice {
    fn as_str(self) -> &'static str {
        match self {
            DateChoice::Today => "today",
            DateChoice::Yesterday => "yesterday",
            DateChoice::Skip => "skip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartRequest {
    ExpensePie,
    IncomePie,
    YearlyDynamics,
}

impl ChartRequest {
    fn as_str(self) -> &'static str {
        match self {
            ChartRequest::ExpensePie => "expense_month",
            ChartRequest::IncomePie => "income_month",
            ChartRequest::YearlyDynamics => "dynamics_year",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddExpense,
    AddIncome,
    QuickExpense,
    QuickCategory { kind: TransactionKind, category: String },
    Category { kind: TransactionKind, category: String },
    TransactionDate(DateChoice),
    Balance,
    Reports,
    Report(PeriodToken),
    Charts,
    Chart(ChartRequest),
    Export,
    ExportAs(ExportFormat),
    Budgets,
    SetBudget,
    ViewBudgets,
    ChooseBudgetPeriod(BudgetPeriod),
    DeleteBudget(i64),
    ConfirmDeleteBudget(i64),
    CancelDeleteBudget,
    EditBudget(i64),
    ViewHistory,
    HistoryPage(u32),
    DeleteTransaction { id: i64, page: u32 },
    ConfirmDeleteTransaction(i64),
    CancelDeleteTransaction { page: u32 },
    HistoryInfo,
    BackMain,
    Cancel,
    // Typed messages.
    Start,
    Menu,
    Help,
    RemoveTransaction(i64),
    RemoveBudget(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    #[error("unknown action `{0}`")]
    Unknown(String),
    #[error("malformed action `{0}`")]
    Malformed(String),
}

impl Command {
    /// Parses the payload attached to a menu button.
    pub fn from_callback(data: &str) -> Result<Self, CommandParseError> {
        let malformed = || CommandParseError::Malformed(data.to_string());
        let command = match data {
            "add_expense" => Command::AddExpense,
            "add_income" => Command::AddIncome,
            "quick_expense" => Command::QuickExpense,
            "balance" => Command::Balance,
            "reports" => Command::Reports,
            "charts" => Command::Charts,
            "export" => Command::Export,
            "budgets" => Command::Budgets,
            "set_budget" => Command::SetBudget,
            "view_budgets" => Command::ViewBudgets,
            "cancel_del_budget" => Command::CancelDeleteBudget,
            "view_history" => Command::ViewHistory,
            "history_info" => Command::HistoryInfo,
            "back_main" => Command::BackMain,
            "cancel" => Command::Cancel,
            _ => {
                if let Some(rest) = data.strip_prefix("quick_cat_") {
                    let (kind, category) = kind_and_category(rest).ok_or_else(malformed)?;
                    Command::QuickCategory { kind, category }
                } else if let Some(rest) = data.strip_prefix("cat_") {
                    let (kind, category) = kind_and_category(rest).ok_or_else(malformed)?;
                    Command::Category { kind, category }
                } else if let Some(rest) = data.strip_prefix("trans_date_") {
                    Command::TransactionDate(match rest {
                        "today" => DateChoice::Today,
                        "yesterday" => DateChoice::Yesterday,
                        "skip" => DateChoice::Skip,
                        _ => return Err(malformed()),
                    })
                } else if let Some(rest) = data.strip_prefix("report_") {
                    Command::Report(PeriodToken::from_str(rest).map_err(|_| malformed())?)
                } else if let Some(rest) = data.strip_prefix("chart_") {
                    Command::Chart(match rest {
                        "expense_month" => ChartRequest::ExpensePie,
                        "income_month" => ChartRequest::IncomePie,
                        "dynamics_year" => ChartRequest::YearlyDynamics,
                        _ => return Err(malformed()),
                    })
                } else if let Some(rest) = data.strip_prefix("export_") {
                    Command::ExportAs(match rest {
                        "csv" => ExportFormat::Csv,
                        "json" => ExportFormat::Json,
                        _ => return Err(malformed()),
                    })
                } else if let Some(rest) = data.strip_prefix("budget_period_") {
                    Command::ChooseBudgetPeriod(
                        BudgetPeriod::from_str(rest).map_err(|_| malformed())?,
                    )
                } else if let Some(rest) = data.strip_prefix("delete_budget_") {
                    Command::DeleteBudget(number(rest).ok_or_else(malformed)?)
                } else if let Some(rest) = data.strip_prefix("confirm_del_budget_") {
                    Command::ConfirmDeleteBudget(number(rest).ok_or_else(malformed)?)
                } else if let Some(rest) = data.strip_prefix("edit_budget_") {
                    Command::EditBudget(number(rest).ok_or_else(malformed)?)
                } else if let Some(rest) = data.strip_prefix("history_page_") {
                    Command::HistoryPage(number(rest).ok_or_else(malformed)?)
                } else if let Some(rest) = data.strip_prefix("delete_trans_") {
                    let (id, page) = rest.split_once('_').ok_or_else(malformed)?;
                    Command::DeleteTransaction {
                        id: number(id).ok_or_else(malformed)?,
                        page: number(page).ok_or_else(malformed)?,
                    }
                } else if let Some(rest) = data.strip_prefix("confirm_del_trans_") {
                    Command::ConfirmDeleteTransaction(number(rest).ok_or_else(malformed)?)
                } else if let Some(rest) = data.strip_prefix("cancel_del_trans_") {
                    Command::CancelDeleteTransaction {
                        page: number(rest).ok_or_else(malformed)?,
                    }
                } else {
                    return Err(CommandParseError::Unknown(data.to_string()));
                }
            }
        };
        Ok(command)
    }

    /// Interprets a typed message. Anything that is not a known slash command is free text.
    pub fn from_message(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed {
            "/start" => return Command::Start,
            "/menu" => return Command::Menu,
            "/help" => return Command::Help,
            "/balance" => return Command::Balance,
            "/cancel" => return Command::Cancel,
            _ => {}
        }
        if let Some(id) = trimmed.strip_prefix("/del_budget_").and_then(number) {
            return Command::RemoveBudget(id);
        }
        if let Some(id) = trimmed.strip_prefix("/del_").and_then(number) {
            return Command::RemoveTransaction(id);
        }
        Command::Text(text.to_string())
    }

    /// Button payload for this command; `None` for commands only reachable by typing.
    pub fn callback_data(&self) -> Option<String> {
        let data = match self {
            Command::AddExpense => "add_expense".to_string(),
            Command::AddIncome => "add_income".to_string(),
            Command::QuickExpense => "quick_expense".to_string(),
            Command::QuickCategory { kind, category } => format!("quick_cat_{kind}_{category}"),
            Command::Category { kind, category } => format!("cat_{kind}_{category}"),
            Command::TransactionDate(choice) => format!("trans_date_{}", choice.as_str()),
            Command::Balance => "balance".to_string(),
            Command::Reports => "reports".to_string(),
            Command::Report(token) => format!("report_{token}"),
            Command::Charts => "charts".to_string(),
            Command::Chart(chart) => format!("chart_{}", chart.as_str()),
            Command::Export => "export".to_string(),
            Command::ExportAs(format) => format!("export_{format}"),
            Command::Budgets => "budgets".to_string(),
            Command::SetBudget => "set_budget".to_string(),
            Command::ViewBudgets => "view_budgets".to_string(),
            Command::ChooseBudgetPeriod(period) => format!("budget_period_{period}"),
            Command::DeleteBudget(id) => format!("delete_budget_{id}"),
            Command::ConfirmDeleteBudget(id) => format!("confirm_del_budget_{id}"),
            Command::CancelDeleteBudget => "cancel_del_budget".to_string(),
            Command::EditBudget(id) => format!("edit_budget_{id}"),
            Command::ViewHistory => "view_history".to_string(),
            Command::HistoryPage(page) => format!("history_page_{page}"),
            Command::DeleteTransaction { id, page } => format!("delete_trans_{id}_{page}"),
            Command::ConfirmDeleteTransaction(id) => format!("confirm_del_trans_{id}"),
            Command::CancelDeleteTransaction { page } => format!("cancel_del_trans_{page}"),
            Command::HistoryInfo => "history_info".to_string(),
            Command::BackMain => "back_main".to_string(),
            Command::Cancel => "cancel".to_string(),
            Command::Start
            | Command::Menu
            | Command::Help
            | Command::RemoveTransaction(_)
            | Command::RemoveBudget(_)
            | Command::Text(_) => return None,
        };
        Some(data)
    }
}

fn kind_and_category(rest: &str) -> Option<(TransactionKind, String)> {
    let (kind, category) = rest.split_once('_')?;
    if category.is_empty() {
        return None;
    }
    Some((kind.parse().ok()?, category.to_string()))
}

fn number<T: FromStr>(raw: &str) -> Option<T> {
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_payload_keeps_underscores_in_name() {
        assert_eq!(
            Command::from_callback("cat_expense_Eating_out"),
            Ok(Command::Category {
                kind: TransactionKind::Expense,
                category: "Eating_out".into()
            })
        );
    }

    #[test]
    fn exact_matches_win_over_prefixes() {
        assert_eq!(Command::from_callback("reports"), Ok(Command::Reports));
        assert_eq!(
            Command::from_callback("report_week"),
            Ok(Command::Report(PeriodToken::Week))
        );
        assert_eq!(Command::from_callback("export"), Ok(Command::Export));
        assert_eq!(Command::from_callback("cancel_del_budget"), Ok(Command::CancelDeleteBudget));
    }

    #[test]
    fn callback_data_is_the_inverse_of_parsing() {
        let commands = [
            Command::QuickCategory {
                kind: TransactionKind::Expense,
                category: "Coffee".into(),
            },
            Command::TransactionDate(DateChoice::Yesterday),
            Command::Chart(ChartRequest::YearlyDynamics),
            Command::ExportAs(ExportFormat::Csv),
            Command::ChooseBudgetPeriod(BudgetPeriod::Year),
            Command::DeleteTransaction { id: 42, page: 3 },
            Command::CancelDeleteTransaction { page: 2 },
            Command::ConfirmDeleteBudget(7),
        ];
        for command in commands {
            let data = command.callback_data().unwrap();
            assert_eq!(Command::from_callback(&data), Ok(command));
        }
    }

    #[test]
    fn malformed_and_unknown_payloads_are_errors() {
        assert!(matches!(
            Command::from_callback("delete_trans_x_1"),
            Err(CommandParseError::Malformed(_))
        ));
        assert!(matches!(
            Command::from_callback("report_fortnight"),
            Err(CommandParseError::Malformed(_))
        ));
        assert!(matches!(
            Command::from_callback("launch_rocket"),
            Err(CommandParseError::Unknown(_))
        ));
    }

    #[test]
    fn messages_map_to_commands() {
        assert_eq!(Command::from_message("/start"), Command::Start);
        assert_eq!(Command::from_message("/del_12"), Command::RemoveTransaction(12));
        assert_eq!(Command::from_message("/del_budget_3"), Command::RemoveBudget(3));
        assert_eq!(Command::from_message("/del_x"), Command::Text("/del_x".into()));
        assert_eq!(Command::from_message(" 150 "), Command::Text(" 150 ".into()));
        assert_eq!(Command::Text("x".into()).callback_data(), None);
    }
}
