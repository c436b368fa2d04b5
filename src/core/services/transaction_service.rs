//! Recording workflow and paged history for ledger transactions.

use serde::Serialize;
use tracing::info;

use crate::core::ledger_store::LedgerStore;
use crate::core::services::{ServiceError, ServiceResult};
use crate::ledger::{Balance, NewTransaction, Transaction, TransactionKind};

use super::budget_service::{BudgetAlert, BudgetService};

/// Result of recording a transaction: its id, the refreshed balance, and any budget alert.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecordOutcome {
    pub id: i64,
    pub balance: Balance,
    pub alert: Option<BudgetAlert>,
}

/// One page of the transaction history. Pages are 1-based.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryPage {
    pub page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub transactions: Vec<Transaction>,
}

impl HistoryPage {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

pub struct TransactionService;

impl TransactionService {
    /// Stores the transaction, then re-reads the balance and, for expenses, checks the
    /// category's monthly budget. Storage faults are returned to the caller.
    pub fn record(store: &LedgerStore, draft: &NewTransaction) -> ServiceResult<RecordOutcome> {
        if draft.category.trim().is_empty() {
            return Err(ServiceError::Invalid("category must not be empty".into()));
        }
        let id = store.add_transaction(draft)?;
        info!(id, user_id = draft.user_id, kind = %draft.kind, amount = %draft.amount, "transaction recorded");
        let balance = store.balance(draft.user_id);
        let alert = match draft.kind {
            TransactionKind::Expense => BudgetService::evaluate(store, draft.user_id, &draft.category),
            TransactionKind::Income => None,
        };
        Ok(RecordOutcome { id, balance, alert })
    }

    /// Returns history page `page`, clamped into the valid range.
    pub fn history(store: &LedgerStore, user_id: i64, page: u32, page_size: u32) -> HistoryPage {
        let page_size = page_size.max(1);
        let requested = page.max(1);
        let offset = (requested - 1).saturating_mul(page_size);
        let mut result = store.list_recent(user_id, page_size, offset);
        let total_pages = total_pages(result.total_count, page_size);

        let page = requested.min(total_pages.max(1));
        if page != requested {
            result = store.list_recent(user_id, page_size, (page - 1) * page_size);
        }
        HistoryPage {
            page,
            total_pages,
            total_count: result.total_count,
            transactions: result.transactions,
        }
    }
}

fn total_pages(count: u64, page_size: u32) -> u32 {
    u32::try_from(count.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}
