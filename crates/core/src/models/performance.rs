use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::diagnostic::Diagnostic;

/// A calendar month, compared numerically by `(year, month)`.
///
/// The derived ordering is numeric, never lexicographic, so month 10
/// sorts after month 2 and December 2023 sorts before January 2024.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        Self { year, month }
    }

    /// The month a date falls in.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First day of the month.
    pub fn first_day(self) -> NaiveDate {
        // month is validated at construction, so this cannot fail
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month (handles leap years).
    pub fn last_day(self) -> NaiveDate {
        self.first_day()
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One month's end-of-month portfolio snapshot for trend charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPerformance {
    pub year: i32,

    pub month: u32,

    /// Total portfolio value at that month's prices
    pub total_value: f64,

    /// `total_value − cost-basis value` of the positions held
    pub capital_gain: f64,

    /// Capital gain as a percentage of the cost-basis value
    /// (0 when the cost-basis value is 0)
    pub performance_pct: f64,
}

impl MonthlyPerformance {
    pub fn month_key(&self) -> MonthKey {
        MonthKey::new(self.year, self.month)
    }
}

/// Result of a monthly performance query: the ascending series plus any
/// per-month findings collected along the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// One entry per month from the first transaction through "now",
    /// ascending by `(year, month)`
    pub series: Vec<MonthlyPerformance>,

    /// Non-fatal findings: unavailable historical prices, over-sells,
    /// mixed currencies
    pub diagnostics: Vec<Diagnostic>,
}

impl PerformanceReport {
    /// True when the portfolio has no transactions — consumers should
    /// render "no data" rather than erroring.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
