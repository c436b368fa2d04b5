use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifetime (or windowed) income, expense, and their difference.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balance {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

impl Balance {
    pub fn from_totals(income: Decimal, expense: Decimal) -> Self {
        Self {
            income,
            expense,
            net: income - expense,
        }
    }
}

/// Sum and count of one category's transactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    pub count: u32,
}
