use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// Direction of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    /// Acquiring units of an instrument
    Buy,
    /// Disposing of units of an instrument
    Sell,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Buy => write!(f, "Buy"),
            TransactionType::Sell => write!(f, "Sell"),
        }
    }
}

/// Currency of record for a transaction's unit price.
///
/// Values in different currencies are never converted by this library;
/// a portfolio mixing currencies gets a `MixedCurrencies` diagnostic and
/// its sums are reported as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    EUR,
    USD,
    CAD,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Currency::EUR => write!(f, "EUR"),
            Currency::USD => write!(f, "USD"),
            Currency::CAD => write!(f, "CAD"),
        }
    }
}

/// A single buy/sell transaction in a portfolio's ledger.
///
/// Transactions are immutable once created; deletion is the only mutation
/// a ledger exposes. Replay order is ascending `(date, id)` — the id
/// tie-break keeps same-day sequences deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: Uuid,

    /// The portfolio this transaction belongs to
    pub portfolio_id: Uuid,

    /// Ticker symbol, uppercased (e.g., "AAPL", "VWCE")
    pub symbol: String,

    /// Number of units (always positive)
    pub quantity: u32,

    /// Buy or Sell
    pub transaction_type: TransactionType,

    /// Price paid/received per unit, in `currency`
    pub unit_price: f64,

    /// Trade date (no time component — daily granularity)
    pub date: NaiveDate,

    /// Currency the unit price is denominated in
    pub currency: Currency,
}

impl Transaction {
    pub fn new(
        portfolio_id: Uuid,
        symbol: impl Into<String>,
        quantity: u32,
        transaction_type: TransactionType,
        unit_price: f64,
        date: NaiveDate,
        currency: Currency,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            portfolio_id,
            symbol: symbol.into().to_uppercase(),
            quantity,
            transaction_type,
            unit_price,
            date,
            currency,
        }
    }

    /// Validate a transaction at ingestion.
    ///
    /// Rules:
    /// - Symbol must be non-empty
    /// - Quantity must be positive
    /// - Unit price must be finite and non-negative
    ///
    /// Malformed transactions are rejected outright, never coerced.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.symbol.trim().is_empty() {
            return Err(CoreError::Validation(
                "Transaction symbol must not be empty".into(),
            ));
        }
        if self.quantity == 0 {
            return Err(CoreError::Validation(format!(
                "Transaction quantity must be positive (got 0 for {})",
                self.symbol
            )));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(CoreError::Validation(format!(
                "Transaction unit price must be finite and non-negative (got {} for {})",
                self.unit_price, self.symbol
            )));
        }
        Ok(())
    }

    /// Replay ordering key: ascending date, ties broken by id.
    pub fn sort_key(&self) -> (NaiveDate, Uuid) {
        (self.date, self.id)
    }
}
