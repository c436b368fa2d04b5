use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::core::ledger_store::LedgerStore;
use crate::core::period;
use crate::core::services::{
    BudgetService, ChartService, ExportFormat, ExportService, ReportService, TransactionService,
};
use crate::core::validation::{parse_amount, sanitize_description};
use crate::ledger::{Budget, BudgetPeriod, NewTransaction, TransactionKind};

use super::command::{ChartRequest, Command, DateChoice};
use super::menu;
use super::render::Renderer;
use super::session::{DialogueState, SessionStore};
use super::{Attachment, OutboundMessage, Reply};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A menu button was pressed; carries its payload.
    Callback(String),
    /// A typed message.
    Message(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub user_id: i64,
    pub username: Option<String>,
    pub payload: Inbound,
}

impl InboundEvent {
    pub fn callback(user_id: i64, data: impl Into<String>) -> Self {
        Self {
            user_id,
            username: None,
            payload: Inbound::Callback(data.into()),
        }
    }

    pub fn message(user_id: i64, text: impl Into<String>) -> Self {
        Self {
            user_id,
            username: None,
            payload: Inbound::Message(text.into()),
        }
    }

    pub fn from_user(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// Routes parsed commands through the per-user state machine and the ledger services.
pub struct Dialogue {
    store: Arc<LedgerStore>,
    sessions: Arc<dyn SessionStore>,
    config: Config,
    renderer: Renderer,
}

impl Dialogue {
    pub fn new(store: Arc<LedgerStore>, sessions: Arc<dyn SessionStore>, config: Config) -> Self {
        let renderer = Renderer::new(config.currency_label.clone());
        Self {
            store,
            sessions,
            config,
            renderer,
        }
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn state(&self, user_id: i64) -> DialogueState {
        self.sessions.load(user_id)
    }

    pub fn handle(&self, event: &InboundEvent) -> Reply {
        let user_id = event.user_id;
        self.store.upsert_user(user_id, event.username.as_deref());
        let command = match &event.payload {
            Inbound::Callback(data) => match Command::from_callback(data) {
                Ok(command) => command,
                Err(err) => {
                    warn!(user_id, %err, "rejected button payload");
                    return Reply::with_menu(
                        "Unknown action. Back to the main menu.",
                        menu::main_menu(),
                    );
                }
            },
            Inbound::Message(text) => Command::from_message(text),
        };
        debug!(user_id, ?command, "dispatching command");
        self.dispatch(user_id, event.username.as_deref(), command)
    }

    pub fn handle_callback(&self, user_id: i64, data: &str) -> Reply {
        self.handle(&InboundEvent::callback(user_id, data))
    }

    pub fn handle_message(&self, user_id: i64, text: &str) -> Reply {
        self.handle(&InboundEvent::message(user_id, text))
    }

    fn dispatch(&self, user_id: i64, username: Option<&str>, command: Command) -> Reply {
        match command {
            Command::Start => {
                self.sessions.reset(user_id);
                Reply::with_menu(self.renderer.welcome(username), menu::main_menu())
            }
            Command::Menu | Command::BackMain => {
                self.sessions.reset(user_id);
                Reply::with_menu("🏠 Main menu", menu::main_menu())
            }
            Command::Help => Reply::with_menu(self.renderer.help(), menu::main_menu()),
            Command::Cancel => {
                self.sessions.reset(user_id);
                Reply::with_menu("✖️ Cancelled.", menu::main_menu())
            }
            Command::AddExpense => self.start_transaction(user_id, TransactionKind::Expense),
            Command::AddIncome => self.start_transaction(user_id, TransactionKind::Income),
            Command::QuickExpense => {
                self.sessions.save(
                    user_id,
                    DialogueState::ChoosingCategory {
                        kind: TransactionKind::Expense,
                    },
                );
                Reply::with_menu(
                    "⚡ Quick expense\n\nPick a popular category:",
                    menu::quick_expense_menu(&self.config.quick_expense_categories),
                )
            }
            Command::QuickCategory { kind, category } => {
                let category = self.config.resolve_quick_category(&category).to_string();
                let date = self.store.today();
                let prompt = self.renderer.amount_prompt(kind, &category, date);
                self.sessions.save(
                    user_id,
                    DialogueState::EnteringAmount {
                        kind,
                        category,
                        date,
                    },
                );
                Reply::with_menu(prompt, menu::cancel_menu())
            }
            Command::Category { kind, category } => self.choose_category(user_id, kind, category),
            Command::TransactionDate(choice) => self.choose_date(user_id, choice),
            Command::Balance => {
                self.sessions.reset(user_id);
                let balance = self.store.balance(user_id);
                Reply::with_menu(self.renderer.balance(&balance), menu::balance_actions_menu())
            }
            Command::Reports => {
                self.sessions.reset(user_id);
                Reply::with_menu("📊 Analytics\n\nChoose a period:", menu::reports_menu())
            }
            Command::Report(token) => {
                let resolved = period::resolve_rolling(token, self.store.today());
                let report = ReportService::resolved_report(&self.store, user_id, &resolved);
                Reply::with_menu(self.renderer.report(&report), menu::reports_menu())
            }
            Command::Charts => {
                self.sessions.reset(user_id);
                Reply::with_menu("📈 Charts\n\nChoose a chart:", menu::charts_menu())
            }
            Command::Chart(request) => self.chart(user_id, request),
            Command::Export => {
                self.sessions.reset(user_id);
                Reply::with_menu("📤 Export\n\nChoose a format:", menu::export_menu())
            }
            Command::ExportAs(format) => self.export(user_id, format),
            Command::Budgets => {
                self.sessions.reset(user_id);
                Reply::with_menu(
                    "🎯 Budgets\n\nSet spending limits per category:",
                    menu::budget_menu(),
                )
            }
            Command::SetBudget => {
                self.sessions.save(user_id, DialogueState::BudgetCategory);
                Reply::with_menu(
                    "🎯 New budget\n\nChoose an expense category:",
                    menu::category_menu(TransactionKind::Expense, &self.config.expense_categories),
                )
            }
            Command::ChooseBudgetPeriod(period) => self.choose_budget_period(user_id, period),
            Command::ViewBudgets | Command::CancelDeleteBudget => {
                self.sessions.reset(user_id);
                self.budget_list(user_id)
            }
            Command::DeleteBudget(id) => {
                self.sessions.reset(user_id);
                match self.store.get_budget(id, user_id) {
                    Some(budget) => Reply::with_menu(
                        format!(
                            "Delete the {} budget for {} ({})?",
                            budget.period.display_name().to_lowercase(),
                            budget.category,
                            self.renderer.amount(budget.limit)
                        ),
                        menu::confirm_delete_budget_menu(id),
                    ),
                    None => Reply::with_menu("Budget not found.", menu::budget_menu()),
                }
            }
            Command::ConfirmDeleteBudget(id) | Command::RemoveBudget(id) => {
                self.sessions.reset(user_id);
                if self.store.delete_budget(id, user_id) {
                    Reply::with_menu("🗑 Budget deleted.", menu::budget_menu())
                } else {
                    Reply::with_menu("Could not delete that budget.", menu::budget_menu())
                }
            }
            Command::EditBudget(id) => self.edit_budget(user_id, id),
            Command::ViewHistory => {
                self.sessions.reset(user_id);
                self.history(user_id, 1)
            }
            Command::HistoryPage(page) | Command::CancelDeleteTransaction { page } => {
                self.sessions.reset(user_id);
                self.history(user_id, page)
            }
            Command::DeleteTransaction { id, page } => {
                self.sessions.reset(user_id);
                match self.store.get_transaction(id, user_id) {
                    Some(txn) => Reply::with_menu(
                        format!(
                            "Delete transaction #{}?\n\n{} {} in {} on {}",
                            txn.id,
                            txn.kind.display_name(),
                            self.renderer.amount(txn.amount),
                            txn.category,
                            txn.date
                        ),
                        menu::confirm_delete_transaction_menu(id, page),
                    ),
                    None => {
                        let mut reply = Reply::single(OutboundMessage::text("Transaction not found."));
                        reply.messages.extend(self.history(user_id, page).messages);
                        reply
                    }
                }
            }
            Command::ConfirmDeleteTransaction(id) => {
                self.sessions.reset(user_id);
                if self.store.delete_transaction(id, user_id) {
                    let mut reply = Reply::single(OutboundMessage::text("🗑 Transaction deleted."));
                    reply.messages.extend(self.history(user_id, 1).messages);
                    reply
                } else {
                    Reply::with_menu("Could not delete that transaction.", menu::back_menu())
                }
            }
            Command::HistoryInfo => Reply::default(),
            Command::RemoveTransaction(id) => {
                self.sessions.reset(user_id);
                if self.store.delete_transaction(id, user_id) {
                    Reply::with_menu("🗑 Transaction deleted.", menu::main_menu())
                } else {
                    Reply::with_menu("Could not delete that transaction.", menu::main_menu())
                }
            }
            Command::Text(text) => self.free_text(user_id, &text),
        }
    }

    fn start_transaction(&self, user_id: i64, kind: TransactionKind) -> Reply {
        self.sessions
            .save(user_id, DialogueState::ChoosingCategory { kind });
        let categories = match kind {
            TransactionKind::Expense => &self.config.expense_categories,
            TransactionKind::Income => &self.config.income_categories,
        };
        Reply::with_menu(
            self.renderer.category_prompt(kind),
            menu::category_menu(kind, categories),
        )
    }

    fn choose_category(&self, user_id: i64, kind: TransactionKind, category: String) -> Reply {
        match self.sessions.load(user_id) {
            DialogueState::BudgetCategory if kind == TransactionKind::Expense => {
                let text = format!(
                    "🎯 New budget\n\n📁 Category: {category}\n\nChoose the budget period:"
                );
                self.sessions
                    .save(user_id, DialogueState::BudgetPeriod { category });
                Reply::with_menu(text, menu::budget_period_menu())
            }
            DialogueState::BudgetCategory => self.stale(),
            state => {
                // A category flow already started keeps its kind.
                let kind = match state {
                    DialogueState::ChoosingCategory { kind } => kind,
                    _ => kind,
                };
                let prompt = self.renderer.date_prompt(kind, &category);
                self.sessions
                    .save(user_id, DialogueState::ChoosingDate { kind, category });
                Reply::with_menu(prompt, menu::date_menu())
            }
        }
    }

    fn choose_date(&self, user_id: i64, choice: DateChoice) -> Reply {
        let DialogueState::ChoosingDate { kind, category } = self.sessions.load(user_id) else {
            return self.stale();
        };
        let today = self.store.today();
        let date: NaiveDate = match choice {
            DateChoice::Today | DateChoice::Skip => today,
            DateChoice::Yesterday => today - Duration::days(1),
        };
        let prompt = self.renderer.amount_prompt(kind, &category, date);
        self.sessions.save(
            user_id,
            DialogueState::EnteringAmount {
                kind,
                category,
                date,
            },
        );
        Reply::with_menu(prompt, menu::cancel_menu())
    }

    fn choose_budget_period(&self, user_id: i64, period: BudgetPeriod) -> Reply {
        let DialogueState::BudgetPeriod { category } = self.sessions.load(user_id) else {
            return self.stale();
        };
        let text = format!(
            "🎯 New budget\n\n📁 Category: {category}\n📅 Period: {}\n\n💵 Enter the budget limit:",
            period.display_name()
        );
        self.sessions
            .save(user_id, DialogueState::BudgetAmount { category, period });
        Reply::with_menu(text, menu::cancel_menu())
    }

    fn edit_budget(&self, user_id: i64, id: i64) -> Reply {
        let Some(budget) = self.store.get_budget(id, user_id) else {
            self.sessions.reset(user_id);
            return Reply::with_menu("Budget not found.", menu::budget_menu());
        };
        let text = format!(
            "✏️ {} budget for {}\nCurrent limit: {}\n\n💵 Enter the new limit:",
            budget.period.display_name(),
            budget.category,
            self.renderer.amount(budget.limit)
        );
        self.sessions.save(
            user_id,
            DialogueState::BudgetAmount {
                category: budget.category,
                period: budget.period,
            },
        );
        Reply::with_menu(text, menu::cancel_menu())
    }

    fn free_text(&self, user_id: i64, text: &str) -> Reply {
        match self.sessions.load(user_id) {
            DialogueState::EnteringAmount {
                kind,
                category,
                date,
            } => match parse_amount(text, self.config.max_amount) {
                Ok(amount) => {
                    self.sessions.save(
                        user_id,
                        DialogueState::EnteringDescription {
                            kind,
                            category,
                            date,
                            amount,
                        },
                    );
                    Reply::with_menu(self.renderer.description_prompt(), menu::cancel_menu())
                }
                Err(err) => self.invalid_amount(&err.to_string()),
            },
            DialogueState::EnteringDescription {
                kind,
                category,
                date,
                amount,
            } => self.record(user_id, kind, category, date, amount, text),
            DialogueState::BudgetAmount { category, period } => {
                match parse_amount(text, self.config.max_amount) {
                    Ok(limit) => self.save_budget(user_id, &category, period, limit),
                    Err(err) => self.invalid_amount(&err.to_string()),
                }
            }
            _ => Reply::with_menu("Use the menu below to choose an action.", menu::main_menu()),
        }
    }

    fn record(
        &self,
        user_id: i64,
        kind: TransactionKind,
        category: String,
        date: NaiveDate,
        amount: Decimal,
        text: &str,
    ) -> Reply {
        let description = sanitize_description(text, self.config.description_max_len);
        let draft = NewTransaction::new(user_id, kind, amount, category)
            .with_description(description)
            .on(date);
        match TransactionService::record(&self.store, &draft) {
            Ok(outcome) => {
                self.sessions.reset(user_id);
                let mut reply = Reply::with_menu(
                    self.renderer.recorded(
                        kind,
                        &draft.category,
                        amount,
                        draft.description.as_deref(),
                        &outcome,
                    ),
                    menu::transaction_success_menu(),
                );
                if let Some(alert) = &outcome.alert {
                    reply.push(OutboundMessage::text(self.renderer.budget_alert(alert)));
                }
                reply
            }
            Err(err) => {
                warn!(user_id, %err, "transaction was not saved; keeping dialogue state");
                Reply::with_menu(self.renderer.save_failed(), menu::cancel_menu())
            }
        }
    }

    fn save_budget(&self, user_id: i64, category: &str, period: BudgetPeriod, limit: Decimal) -> Reply {
        match self.store.set_budget(user_id, category, limit, period) {
            Ok(_) => {
                self.sessions.reset(user_id);
                Reply::with_menu(
                    self.renderer.budget_saved(category, period, limit),
                    menu::budget_menu(),
                )
            }
            Err(err) => {
                warn!(user_id, %err, "budget was not saved; keeping dialogue state");
                Reply::with_menu(self.renderer.save_failed(), menu::cancel_menu())
            }
        }
    }

    fn invalid_amount(&self, reason: &str) -> Reply {
        Reply::with_menu(
            self.renderer.invalid_amount(reason, self.config.max_amount),
            menu::cancel_menu(),
        )
    }

    fn chart(&self, user_id: i64, request: ChartRequest) -> Reply {
        self.sessions.reset(user_id);
        let rendered = match request {
            ChartRequest::ExpensePie => {
                ChartService::category_pie(&self.store, user_id, TransactionKind::Expense)
                    .map(|chart| (self.renderer.pie(&chart), Attachment::Pie(chart)))
            }
            ChartRequest::IncomePie => {
                ChartService::category_pie(&self.store, user_id, TransactionKind::Income)
                    .map(|chart| (self.renderer.pie(&chart), Attachment::Pie(chart)))
            }
            ChartRequest::YearlyDynamics => ChartService::yearly_dynamics(&self.store, user_id)
                .map(|chart| (self.renderer.dynamics(&chart), Attachment::Dynamics(chart))),
        };
        match rendered {
            Some((text, attachment)) => Reply::single(
                OutboundMessage::text(text)
                    .with_menu(menu::charts_menu())
                    .with_attachment(attachment),
            ),
            None => Reply::with_menu(
                "Not enough data for a chart yet.\nAdd some transactions first.",
                menu::charts_menu(),
            ),
        }
    }

    fn export(&self, user_id: i64, format: ExportFormat) -> Reply {
        self.sessions.reset(user_id);
        match ExportService::export(&self.store, user_id, format) {
            Ok(Some(file)) => Reply::single(
                OutboundMessage::text(format!(
                    "📤 Exported {} transactions to {}",
                    file.rows, file.file_name
                ))
                .with_menu(menu::back_menu())
                .with_attachment(Attachment::Export(file)),
            ),
            Ok(None) => Reply::with_menu(
                "Nothing to export yet: you have no transactions.",
                menu::export_menu(),
            ),
            Err(err) => {
                error!(user_id, %err, "export failed");
                Reply::with_menu("Export failed. Please try again later.", menu::export_menu())
            }
        }
    }

    fn history(&self, user_id: i64, page: u32) -> Reply {
        let page = TransactionService::history(
            &self.store,
            user_id,
            page,
            self.config.history_page_size,
        );
        let text = self.renderer.history(&page);
        if page.transactions.is_empty() {
            return Reply::with_menu(text, menu::back_menu());
        }
        Reply::with_menu(
            text,
            menu::history_menu(page.page, page.total_pages, &page.transactions),
        )
    }

    fn budget_list(&self, user_id: i64) -> Reply {
        let lines = BudgetService::overview(&self.store, user_id);
        let text = self.renderer.budget_overview(&lines);
        if lines.is_empty() {
            return Reply::with_menu(text, menu::budget_menu());
        }
        let budgets: Vec<Budget> = lines.iter().map(|line| line.budget.clone()).collect();
        Reply::with_menu(text, menu::budget_list_menu(&budgets))
    }

    fn stale(&self) -> Reply {
        Reply::with_menu("This button is no longer active.", menu::main_menu())
    }
}
