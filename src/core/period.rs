//! Date-range computation for reports, charts, and budgets.
//!
//! Two families of windows exist and are kept apart on purpose:
//! rolling windows ("now minus N days") drive reports and charts, while calendar windows
//! (1st of the month or year up to today) drive budget tracking.

use std::{fmt, str::FromStr};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::ledger::{date_range, BudgetPeriod, DateRange};

/// Lower bound used by the `all` token.
pub fn all_time_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Named report periods selectable from the menu.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PeriodToken {
    Today,
    Yesterday,
    Week,
    Month,
    Year,
    All,
}

impl PeriodToken {
    pub const ALL: [PeriodToken; 6] = [
        PeriodToken::Today,
        PeriodToken::Yesterday,
        PeriodToken::Week,
        PeriodToken::Month,
        PeriodToken::Year,
        PeriodToken::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PeriodToken::Today => "today",
            PeriodToken::Yesterday => "yesterday",
            PeriodToken::Week => "week",
            PeriodToken::Month => "month",
            PeriodToken::Year => "year",
            PeriodToken::All => "all",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PeriodToken::Today => "Today",
            PeriodToken::Yesterday => "Yesterday",
            PeriodToken::Week => "Last 7 days",
            PeriodToken::Month => "Last 30 days",
            PeriodToken::Year => "Last 365 days",
            PeriodToken::All => "All time",
        }
    }
}

impl fmt::Display for PeriodToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodToken {
    type Err = UnknownPeriodToken;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        PeriodToken::ALL
            .into_iter()
            .find(|token| token.as_str() == value)
            .ok_or_else(|| UnknownPeriodToken(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPeriodToken(pub String);

impl fmt::Display for UnknownPeriodToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown period `{}`", self.0)
    }
}

impl std::error::Error for UnknownPeriodToken {}

/// A period token resolved against a concrete day.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ResolvedPeriod {
    pub token: PeriodToken,
    pub range: DateRange,
    pub label: &'static str,
}

/// Maps a token onto a rolling window ending at `today`.
///
/// `month` is the last 30 days and `year` the last 365 days, not calendar-aligned.
pub fn resolve_rolling(token: PeriodToken, today: NaiveDate) -> ResolvedPeriod {
    let (start, end) = match token {
        PeriodToken::Today => (today, today),
        PeriodToken::Yesterday => {
            let yesterday = today - Duration::days(1);
            (yesterday, yesterday)
        }
        PeriodToken::Week => (today - Duration::days(7), today),
        PeriodToken::Month => (today - Duration::days(30), today),
        PeriodToken::Year => (today - Duration::days(365), today),
        PeriodToken::All => (all_time_epoch().min(today), today),
    };
    ResolvedPeriod {
        token,
        range: DateRange { start, end },
        label: token.label(),
    }
}

/// Calendar month to date: the 1st of the current month through `today`.
pub fn calendar_month_to_date(today: NaiveDate) -> DateRange {
    DateRange {
        start: date_range::month_start(today),
        end: today,
    }
}

/// Calendar year to date: January 1st through `today`.
pub fn calendar_year_to_date(today: NaiveDate) -> DateRange {
    DateRange {
        start: date_range::year_start(today),
        end: today,
    }
}

/// Tracking window for a budget of the given period kind.
pub fn budget_window(period: BudgetPeriod, today: NaiveDate) -> DateRange {
    match period {
        BudgetPeriod::Month => calendar_month_to_date(today),
        BudgetPeriod::Year => calendar_year_to_date(today),
    }
}
