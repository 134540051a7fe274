use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use log::debug;

use crate::models::diagnostic::Diagnostic;
use crate::models::performance::{MonthKey, MonthlyPerformance};
use crate::models::position::Position;
use crate::models::price::MonthlyPrices;
use crate::models::transaction::{Transaction, TransactionType};

/// The monthly series plus the findings from building it.
#[derive(Debug, Clone)]
pub struct SeriesOutcome {
    /// Ascending by `(year, month)`, one entry per month in range
    pub series: Vec<MonthlyPerformance>,

    pub diagnostics: Vec<Diagnostic>,
}

/// Buckets a portfolio's ledger into ordered per-month snapshots for
/// trend charting.
///
/// Pure and restartable: callers supply the already-resolved historical
/// prices and the `as_of` date, so identical inputs always produce the
/// identical series.
pub struct PerformanceService;

impl PerformanceService {
    pub fn new() -> Self {
        Self
    }

    /// The `(symbol, month)` pairs a caller must price to build the series:
    /// every symbol held with non-zero quantity at each month-end, for each
    /// month from the first transaction through `as_of`. Deduplicated, so
    /// each pair is fetched at most once per call.
    pub fn price_requirements(
        &self,
        transactions: &[Transaction],
        as_of: NaiveDate,
    ) -> Vec<(String, MonthKey)> {
        let mut requirements = BTreeSet::new();
        for (month, positions) in self.month_states(transactions, as_of).0 {
            for (symbol, position) in &positions {
                if position.quantity > 0 {
                    requirements.insert((symbol.clone(), month));
                }
            }
        }
        requirements.into_iter().collect()
    }

    /// Build the monthly performance series.
    ///
    /// The month range runs from the earliest transaction's month through
    /// `as_of`'s month. Each month's cumulative position is valued at that
    /// month's historical price. A month with no ledger activity is not
    /// omitted: it carries the prior month's ending position, revalued at
    /// the new month's price.
    ///
    /// A `(symbol, month)` the price table cannot resolve is excluded from
    /// that month's sums with a diagnostic; if a month holds positions but
    /// none of them price, the previous month's figures are carried
    /// forward unchanged.
    pub fn build_series(
        &self,
        transactions: &[Transaction],
        prices: &MonthlyPrices,
        as_of: NaiveDate,
    ) -> SeriesOutcome {
        let (states, mut diagnostics) = self.month_states(transactions, as_of);

        let mut series = Vec::with_capacity(states.len());
        let mut last_known: Option<(f64, f64, f64)> = None;

        for (month, positions) in states {
            let mut total_value = 0.0;
            let mut cost_value = 0.0;
            let mut any_held = false;
            let mut any_priced = false;

            for (symbol, position) in &positions {
                if position.quantity == 0 {
                    continue;
                }
                any_held = true;
                match prices.get(symbol, month) {
                    Some(price) => {
                        total_value += f64::from(position.quantity) * price;
                        cost_value += position.cost_value();
                        any_priced = true;
                    }
                    None => diagnostics.push(Diagnostic::HistoricalPriceUnavailable {
                        symbol: symbol.clone(),
                        month,
                    }),
                }
            }

            let (value, gain, pct) = if any_held && !any_priced {
                // No price resolved for anything held this month: repeat the
                // last known valuation rather than reporting a spurious zero.
                debug!("no prices for {month}; carrying last known valuation forward");
                last_known.unwrap_or((0.0, 0.0, 0.0))
            } else {
                let gain = total_value - cost_value;
                let pct = if cost_value == 0.0 {
                    0.0
                } else {
                    gain / cost_value * 100.0
                };
                last_known = Some((total_value, gain, pct));
                (total_value, gain, pct)
            };

            series.push(MonthlyPerformance {
                year: month.year,
                month: month.month,
                total_value: value,
                capital_gain: gain,
                performance_pct: pct,
            });
        }

        SeriesOutcome {
            series,
            diagnostics,
        }
    }

    /// Cumulative end-of-month positions for every month in range, via a
    /// single chronological pass over the ledger.
    ///
    /// Same replay rule as the holdings aggregation: ascending `(date, id)`,
    /// weighted basis on Buy, quantity reduction on Sell. An over-sell
    /// excludes the symbol from the month it is detected in onwards and is
    /// diagnosed once.
    fn month_states(
        &self,
        transactions: &[Transaction],
        as_of: NaiveDate,
    ) -> (Vec<(MonthKey, BTreeMap<String, Position>)>, Vec<Diagnostic>) {
        let mut ordered: Vec<&Transaction> = transactions.iter().collect();
        ordered.sort_by_key(|tx| tx.sort_key());

        let first_month = match ordered.first() {
            Some(tx) => MonthKey::from_date(tx.date),
            None => return (Vec::new(), Vec::new()),
        };
        let last_month = MonthKey::from_date(as_of);
        if first_month > last_month {
            return (Vec::new(), Vec::new());
        }

        let mut states = Vec::new();
        let mut diagnostics = Vec::new();
        let mut positions: BTreeMap<String, Position> = BTreeMap::new();
        let mut oversold: BTreeSet<String> = BTreeSet::new();
        let mut idx = 0;

        let mut month = first_month;
        loop {
            let month_end = month.last_day();

            while idx < ordered.len() && ordered[idx].date <= month_end {
                let tx = ordered[idx];
                idx += 1;
                if oversold.contains(&tx.symbol) {
                    continue;
                }
                let position = positions
                    .entry(tx.symbol.clone())
                    .or_insert_with(|| Position::opened(tx.symbol.as_str()));
                match tx.transaction_type {
                    TransactionType::Buy => position.buy(tx.quantity, tx.unit_price),
                    TransactionType::Sell => {
                        if tx.quantity > position.quantity {
                            diagnostics.push(Diagnostic::InsufficientHoldings {
                                symbol: tx.symbol.clone(),
                                requested: tx.quantity,
                                held: position.quantity,
                            });
                            positions.remove(&tx.symbol);
                            oversold.insert(tx.symbol.clone());
                        } else {
                            position.sell(tx.quantity);
                        }
                    }
                }
            }

            states.push((month, positions.clone()));

            if month == last_month {
                break;
            }
            month = month.next();
        }

        (states, diagnostics)
    }
}

impl Default for PerformanceService {
    fn default() -> Self {
        Self::new()
    }
}
