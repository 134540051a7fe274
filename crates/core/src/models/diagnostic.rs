use serde::{Deserialize, Serialize};

use super::performance::MonthKey;
use super::transaction::Currency;

/// A non-fatal, per-symbol or per-month finding collected while computing
/// a report.
///
/// Diagnostics implement the partial-success model: one symbol's problem
/// never aborts the computation for the rest of the portfolio. Callers can
/// distinguish "no data" (empty result, no diagnostics) from "data
/// partially unavailable" (diagnostics present) from "request failed"
/// (a `CoreError` was returned instead).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// A Sell exceeded the quantity held at that point of the replay.
    /// The symbol is excluded from the result; other symbols are unaffected.
    InsufficientHoldings {
        symbol: String,
        requested: u32,
        held: u32,
    },

    /// The oracle had no current price for a symbol; its holding is
    /// reported with valuation fields undefined.
    PriceUnavailable { symbol: String },

    /// The oracle had no price for a symbol in a given month; that month's
    /// sums exclude the symbol.
    HistoricalPriceUnavailable { symbol: String, month: MonthKey },

    /// The ledger mixes transaction currencies. Sums are reported without
    /// conversion — interpreting them is up to the caller.
    MixedCurrencies { currencies: Vec<Currency> },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::InsufficientHoldings {
                symbol,
                requested,
                held,
            } => write!(
                f,
                "sell of {requested} {symbol} exceeds held quantity {held}; symbol excluded"
            ),
            Diagnostic::PriceUnavailable { symbol } => {
                write!(f, "no current price for {symbol}; valuation undefined")
            }
            Diagnostic::HistoricalPriceUnavailable { symbol, month } => {
                write!(f, "no price for {symbol} in {month}; excluded from that month")
            }
            Diagnostic::MixedCurrencies { currencies } => {
                let list: Vec<String> = currencies.iter().map(Currency::to_string).collect();
                write!(
                    f,
                    "portfolio mixes currencies ({}); sums are not converted",
                    list.join(", ")
                )
            }
        }
    }
}
