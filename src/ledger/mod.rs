//! Ledger data model: users, transactions, budgets, and their value types.

pub mod budget;
pub mod date_range;
pub mod money;
pub mod summary;
pub mod transaction;
pub mod user;

pub use budget::{Budget, BudgetPeriod, BudgetSpend};
pub use date_range::{DateRange, DateRangeError};
pub use summary::{Balance, CategoryTotal};
pub use transaction::{NewTransaction, Transaction, TransactionKind};
pub use user::User;
