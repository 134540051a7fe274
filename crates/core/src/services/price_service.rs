use std::collections::BTreeSet;

use log::warn;

use crate::models::performance::MonthKey;
use crate::models::price::{CurrentPrices, MonthlyPrices};
use crate::providers::traits::PriceOracle;

/// Resolves prices from the oracle into per-call snapshots.
///
/// Each distinct symbol — and each distinct `(symbol, month)` pair for the
/// monthly builder — is fetched at most once per call. The snapshot lives
/// for that one call and is discarded afterwards; nothing is shared across
/// calls or portfolios. Bounding slow lookups is the oracle's job, not
/// ours: a failed or nonsensical lookup degrades to "unavailable" and the
/// computation carries on.
pub struct PriceService;

impl PriceService {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the current price of every symbol, once each.
    pub async fn current_prices(
        &self,
        oracle: &dyn PriceOracle,
        symbols: &BTreeSet<String>,
    ) -> CurrentPrices {
        let mut snapshot = CurrentPrices::new();
        for symbol in symbols {
            match oracle.current_price(symbol).await {
                Ok(price) if Self::is_sane(price) => snapshot.set(symbol.as_str(), price),
                Ok(price) => {
                    warn!(
                        "{} returned invalid current price {price} for {symbol}; treating as unavailable",
                        oracle.name()
                    );
                    snapshot.set_unavailable(symbol.as_str());
                }
                Err(e) => {
                    warn!("no current price for {symbol}: {e}");
                    snapshot.set_unavailable(symbol.as_str());
                }
            }
        }
        snapshot
    }

    /// Resolve each required `(symbol, month)` historical price, once each.
    pub async fn monthly_prices(
        &self,
        oracle: &dyn PriceOracle,
        requirements: &[(String, MonthKey)],
    ) -> MonthlyPrices {
        let mut snapshot = MonthlyPrices::new();
        for (symbol, month) in requirements {
            if snapshot.contains(symbol, *month) {
                continue;
            }
            match oracle.price_at(symbol, month.year, month.month).await {
                Ok(price) if Self::is_sane(price) => snapshot.set(symbol.as_str(), *month, price),
                Ok(price) => {
                    warn!(
                        "{} returned invalid price {price} for {symbol} in {month}; treating as unavailable",
                        oracle.name()
                    );
                    snapshot.set_unavailable(symbol.as_str(), *month);
                }
                Err(e) => {
                    warn!("no price for {symbol} in {month}: {e}");
                    snapshot.set_unavailable(symbol.as_str(), *month);
                }
            }
        }
        snapshot
    }

    /// Prices must be finite and non-negative to enter a snapshot.
    fn is_sane(price: f64) -> bool {
        price.is_finite() && price >= 0.0
    }
}

impl Default for PriceService {
    fn default() -> Self {
        Self::new()
    }
}
