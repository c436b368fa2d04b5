use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a ledger entry. Closed set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = UnknownKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Raised when a persisted or parsed kind label is outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown kind `{}`", self.0)
    }
}

impl std::error::Error for UnknownKind {}

/// A persisted income or expense entry owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: NaiveDateTime,
}

impl Transaction {
    /// Amount with the sign of its direction: expenses are negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// Input for recording a new transaction; the store assigns id and creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: i64,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: String,
    pub description: Option<String>,
    /// Effective date; `None` means "today" according to the store clock.
    pub date: Option<NaiveDate>,
}

impl NewTransaction {
    pub fn new(
        user_id: i64,
        kind: TransactionKind,
        amount: Decimal,
        category: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            kind,
            amount,
            category: category.into(),
            description: None,
            date: None,
        }
    }

    pub fn expense(user_id: i64, amount: Decimal, category: impl Into<String>) -> Self {
        Self::new(user_id, TransactionKind::Expense, amount, category)
    }

    pub fn income(user_id: i64, amount: Decimal, category: impl Into<String>) -> Self {
        Self::new(user_id, TransactionKind::Income, amount, category)
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}
