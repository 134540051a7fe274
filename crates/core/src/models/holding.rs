use serde::{Deserialize, Serialize};

use super::diagnostic::Diagnostic;
use super::position::Position;

/// The externally visible, fully valued view of a position at the current
/// price. Recomputed on every query — never cached or stored — so it is
/// always consistent with the latest price read.
///
/// Valuation fields are `None` exactly when `price_unavailable` is true:
/// a symbol the oracle cannot price is still reported, not dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol, uppercased
    pub symbol: String,

    /// Units currently held
    pub quantity: u32,

    /// Weighted average acquisition price per unit
    pub cost_basis_per_unit: f64,

    /// Latest known price per unit, if the oracle could supply one
    pub current_price: Option<f64>,

    /// `quantity × current_price`
    pub current_value: Option<f64>,

    /// `current_value − quantity × cost_basis_per_unit`
    pub capital_gain: Option<f64>,

    /// Capital gain as a percentage of the cost-basis value
    /// (0 when the cost-basis value is 0)
    pub performance_pct: Option<f64>,

    /// True when the oracle had no price for this symbol
    pub price_unavailable: bool,
}

impl Holding {
    /// Value a replayed position at the current price.
    ///
    /// A fully divested position (quantity 0) values to gain 0 and
    /// performance 0 by convention.
    pub fn valued(position: &Position, current_price: f64) -> Self {
        let cost_value = position.cost_value();
        let current_value = f64::from(position.quantity) * current_price;
        let capital_gain = current_value - cost_value;
        let performance_pct = if cost_value == 0.0 {
            0.0
        } else {
            capital_gain / cost_value * 100.0
        };
        Self {
            symbol: position.symbol.clone(),
            quantity: position.quantity,
            cost_basis_per_unit: position.cost_basis_per_unit,
            current_price: Some(current_price),
            current_value: Some(current_value),
            capital_gain: Some(capital_gain),
            performance_pct: Some(performance_pct),
            price_unavailable: false,
        }
    }

    /// A fully divested holding. Zero quantity values to zero gain and
    /// zero performance whether or not a price is known, so nothing here
    /// is flagged unavailable.
    pub fn divested(position: &Position) -> Self {
        debug_assert_eq!(position.quantity, 0);
        Self {
            symbol: position.symbol.clone(),
            quantity: 0,
            cost_basis_per_unit: position.cost_basis_per_unit,
            current_price: None,
            current_value: Some(0.0),
            capital_gain: Some(0.0),
            performance_pct: Some(0.0),
            price_unavailable: false,
        }
    }

    /// A holding whose symbol the oracle could not price. The position
    /// itself is still reported; valuation fields stay undefined.
    pub fn unpriced(position: &Position) -> Self {
        Self {
            symbol: position.symbol.clone(),
            quantity: position.quantity,
            cost_basis_per_unit: position.cost_basis_per_unit,
            current_price: None,
            current_value: None,
            capital_gain: None,
            performance_pct: None,
            price_unavailable: true,
        }
    }

    /// Cost-basis value of the held quantity.
    pub fn cost_value(&self) -> f64 {
        f64::from(self.quantity) * self.cost_basis_per_unit
    }
}

/// Result of a holdings query: the valued holdings plus any per-symbol
/// findings collected along the way (partial-success model).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldingsReport {
    /// One combined holding per symbol, ordered by symbol
    pub holdings: Vec<Holding>,

    /// Non-fatal findings: unavailable prices, over-sells, mixed currencies
    pub diagnostics: Vec<Diagnostic>,
}

impl HoldingsReport {
    /// True when the ledger held no reportable positions at all.
    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }
}
