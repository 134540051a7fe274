use serde::{Deserialize, Serialize};

/// Running per-symbol state accumulated by replaying a transaction
/// sequence in chronological order.
///
/// The cost basis is a quantity-weighted average over Buys; Sells reduce
/// the quantity but never touch the basis (weighted-average-cost lot
/// accounting).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Ticker symbol, uppercased
    pub symbol: String,

    /// Units currently held
    pub quantity: u32,

    /// Weighted average acquisition price per unit
    pub cost_basis_per_unit: f64,
}

impl Position {
    /// A fresh, empty position for a symbol.
    pub fn opened(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            quantity: 0,
            cost_basis_per_unit: 0.0,
        }
    }

    /// Apply a Buy: fold the new lot into the weighted average basis.
    pub fn buy(&mut self, quantity: u32, unit_price: f64) {
        let held = f64::from(self.quantity);
        let bought = f64::from(quantity);
        self.cost_basis_per_unit =
            (self.cost_basis_per_unit * held + unit_price * bought) / (held + bought);
        self.quantity += quantity;
    }

    /// Apply a Sell. The caller must have checked `quantity <= self.quantity`;
    /// the basis is intentionally left unchanged.
    pub fn sell(&mut self, quantity: u32) {
        debug_assert!(quantity <= self.quantity);
        self.quantity -= quantity;
    }

    /// Cost-basis value of the held quantity.
    pub fn cost_value(&self) -> f64 {
        f64::from(self.quantity) * self.cost_basis_per_unit
    }
}
