use std::collections::BTreeMap;

use log::debug;

use crate::models::diagnostic::Diagnostic;
use crate::models::holding::Holding;
use crate::models::position::Position;
use crate::models::price::CurrentPrices;
use crate::models::transaction::{Transaction, TransactionType};

/// Replayed per-symbol positions plus the findings from the replay.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// One position per symbol, ordered by symbol
    pub positions: BTreeMap<String, Position>,

    /// Over-sells detected during replay, scoped to their symbol
    pub diagnostics: Vec<Diagnostic>,
}

/// Valued holdings plus the findings from replay and valuation.
#[derive(Debug, Clone)]
pub struct HoldingsOutcome {
    /// One holding per symbol, ordered by symbol
    pub holdings: Vec<Holding>,

    pub diagnostics: Vec<Diagnostic>,
}

/// Folds an ordered transaction sequence into weighted-average-cost
/// positions and values them at current prices.
///
/// Pure business logic — no I/O, no price fetching. Easy to test.
pub struct HoldingsService;

impl HoldingsService {
    pub fn new() -> Self {
        Self
    }

    /// Replay a portfolio's transactions into one position per symbol.
    ///
    /// This is the single pure reduction the rest of the library builds on:
    /// transactions are grouped by symbol and replayed in ascending
    /// `(date, id)` order. A Buy folds into the weighted average basis; a
    /// Sell reduces the quantity and leaves the basis alone.
    ///
    /// A Sell exceeding the held quantity excludes that symbol from the
    /// result with an `InsufficientHoldings` diagnostic; the remaining
    /// symbols replay unaffected.
    pub fn replay_positions(&self, transactions: &[Transaction]) -> ReplayOutcome {
        let mut by_symbol: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
        for tx in transactions {
            by_symbol.entry(tx.symbol.as_str()).or_default().push(tx);
        }

        let mut positions = BTreeMap::new();
        let mut diagnostics = Vec::new();

        for (symbol, mut txs) in by_symbol {
            txs.sort_by_key(|tx| tx.sort_key());

            let mut position = Position::opened(symbol);
            let mut oversold = false;

            for tx in txs {
                match tx.transaction_type {
                    TransactionType::Buy => position.buy(tx.quantity, tx.unit_price),
                    TransactionType::Sell => {
                        if tx.quantity > position.quantity {
                            diagnostics.push(Diagnostic::InsufficientHoldings {
                                symbol: symbol.to_string(),
                                requested: tx.quantity,
                                held: position.quantity,
                            });
                            oversold = true;
                            break;
                        }
                        position.sell(tx.quantity);
                    }
                }
            }

            if oversold {
                debug!("excluding {symbol} from holdings: over-sell during replay");
            } else {
                positions.insert(symbol.to_string(), position);
            }
        }

        ReplayOutcome {
            positions,
            diagnostics,
        }
    }

    /// Replay transactions and value the resulting positions at current
    /// prices.
    ///
    /// A symbol without a price is still returned, flagged
    /// `price_unavailable`, so one failed lookup never hides the position
    /// or aborts the rest. A fully divested position (quantity 0) values
    /// to gain 0 / performance 0 regardless of price availability.
    pub fn aggregate(
        &self,
        transactions: &[Transaction],
        prices: &CurrentPrices,
    ) -> HoldingsOutcome {
        let ReplayOutcome {
            positions,
            mut diagnostics,
        } = self.replay_positions(transactions);

        let mut holdings = Vec::with_capacity(positions.len());
        for (symbol, position) in positions {
            match prices.get(&symbol) {
                Some(price) => holdings.push(Holding::valued(&position, price)),
                // Divested: valuation is determined (zero) without a price
                None if position.quantity == 0 => {
                    holdings.push(Holding::divested(&position));
                }
                None => {
                    diagnostics.push(Diagnostic::PriceUnavailable { symbol });
                    holdings.push(Holding::unpriced(&position));
                }
            }
        }

        HoldingsOutcome {
            holdings,
            diagnostics,
        }
    }

    /// Merge same-symbol lot holdings into one holding per symbol.
    ///
    /// The ledger may expose holdings pre-split into lots (e.g. by
    /// acquisition batch); this is the second stage of the
    /// replay-then-combine pipeline. Input order does not matter; output
    /// is ordered by symbol.
    pub fn combine(&self, lots: &[Holding]) -> Vec<Holding> {
        let mut by_symbol: BTreeMap<&str, Vec<&Holding>> = BTreeMap::new();
        for lot in lots {
            by_symbol.entry(lot.symbol.as_str()).or_default().push(lot);
        }

        by_symbol
            .into_values()
            .map(|group| Self::combine_lots(&group))
            .collect()
    }

    /// Combine one symbol's lots via an exact, order-independent reduction.
    ///
    /// All sums are completed first and each derived figure is computed
    /// exactly once from the totals — the combined performance is the
    /// quantity-weighted average `Σ(perf × qty) / Σ qty`, never an
    /// incremental average revisited per lot.
    fn combine_lots(lots: &[&Holding]) -> Holding {
        if lots.len() == 1 {
            return lots[0].clone();
        }

        let symbol = lots[0].symbol.clone();
        let total_quantity: u32 = lots.iter().map(|l| l.quantity).sum();
        let quantity_f = f64::from(total_quantity);

        let cost_basis_per_unit = if total_quantity == 0 {
            0.0
        } else {
            lots.iter()
                .map(|l| f64::from(l.quantity) * l.cost_basis_per_unit)
                .sum::<f64>()
                / quantity_f
        };

        let all_priced = lots.iter().all(|l| !l.price_unavailable);
        if !all_priced {
            return Holding {
                symbol,
                quantity: total_quantity,
                cost_basis_per_unit,
                current_price: None,
                current_value: None,
                capital_gain: None,
                performance_pct: None,
                price_unavailable: true,
            };
        }

        let current_value: f64 = lots.iter().filter_map(|l| l.current_value).sum();
        let capital_gain: f64 = lots.iter().filter_map(|l| l.capital_gain).sum();
        let weighted_performance: f64 = lots
            .iter()
            .map(|l| l.performance_pct.unwrap_or(0.0) * f64::from(l.quantity))
            .sum();

        let performance_pct = if total_quantity == 0 {
            0.0
        } else {
            weighted_performance / quantity_f
        };
        let current_price = if total_quantity == 0 {
            None
        } else {
            Some(current_value / quantity_f)
        };

        Holding {
            symbol,
            quantity: total_quantity,
            cost_basis_per_unit,
            current_price,
            current_value: Some(current_value),
            capital_gain: Some(capital_gain),
            performance_pct: Some(performance_pct),
            price_unavailable: false,
        }
    }
}

impl Default for HoldingsService {
    fn default() -> Self {
        Self::new()
    }
}
