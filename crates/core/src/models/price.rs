use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::performance::MonthKey;

/// Current prices resolved once for the lifetime of a single query.
///
/// The inner `Option` distinguishes "fetched but unavailable" (`None`)
/// from "never asked" (key absent) — the oracle is consulted at most once
/// per symbol per call, and the snapshot is discarded when the call
/// returns. Nothing here is shared across calls or portfolios.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentPrices {
    prices: HashMap<String, Option<f64>>,
}

impl CurrentPrices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved price for a symbol.
    pub fn set(&mut self, symbol: impl Into<String>, price: f64) {
        self.prices.insert(symbol.into().to_uppercase(), Some(price));
    }

    /// Record that the oracle had no price for a symbol.
    pub fn set_unavailable(&mut self, symbol: impl Into<String>) {
        self.prices.insert(symbol.into().to_uppercase(), None);
    }

    /// The price for a symbol, if one was resolved.
    pub fn get(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied().flatten()
    }

    /// Number of symbols consulted (available or not).
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Historical month-end prices resolved once per `(symbol, month)` for the
/// lifetime of a single monthly-series query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyPrices {
    prices: HashMap<(String, MonthKey), Option<f64>>,
}

impl MonthlyPrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, symbol: impl Into<String>, month: MonthKey, price: f64) {
        self.prices
            .insert((symbol.into().to_uppercase(), month), Some(price));
    }

    pub fn set_unavailable(&mut self, symbol: impl Into<String>, month: MonthKey) {
        self.prices
            .insert((symbol.into().to_uppercase(), month), None);
    }

    pub fn get(&self, symbol: &str, month: MonthKey) -> Option<f64> {
        self.prices
            .get(&(symbol.to_string(), month))
            .copied()
            .flatten()
    }

    /// Whether a `(symbol, month)` pair has been consulted already.
    pub fn contains(&self, symbol: &str, month: MonthKey) -> bool {
        self.prices.contains_key(&(symbol.to_string(), month))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
