pub mod budget_service;
pub mod chart_service;
pub mod export_service;
pub mod report_service;
pub mod transaction_service;

pub use budget_service::{BudgetAlert, BudgetAlertLevel, BudgetOverviewLine, BudgetService, BudgetStatus};
pub use chart_service::{ChartService, DynamicsChart, PieChart, PieSlice};
pub use export_service::{ExportFile, ExportFormat, ExportService};
pub use report_service::{MonthlyPoint, PeriodReport, ReportService};
pub use transaction_service::{HistoryPage, RecordOutcome, TransactionService};

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
}
