use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A spending limit for one category of one user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: i64,
    pub user_id: i64,
    pub category: String,
    pub limit: Decimal,
    pub period: BudgetPeriod,
    pub created_at: NaiveDateTime,
}

/// Enumeration of budgeting periods. Closed set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Month,
    Year,
}

impl BudgetPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            BudgetPeriod::Month => "month",
            BudgetPeriod::Year => "year",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BudgetPeriod::Month => "Monthly",
            BudgetPeriod::Year => "Yearly",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = UnknownPeriod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "month" => Ok(BudgetPeriod::Month),
            "year" => Ok(BudgetPeriod::Year),
            other => Err(UnknownPeriod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPeriod(pub String);

impl fmt::Display for UnknownPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown budget period `{}`", self.0)
    }
}

impl std::error::Error for UnknownPeriod {}

/// Configured limit next to the actual spend inside a window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetSpend {
    pub limit: Decimal,
    pub spent: Decimal,
}
