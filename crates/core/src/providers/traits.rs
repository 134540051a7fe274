use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::transaction::Transaction;

/// The transaction ledger a portfolio's buy/sell history is read from.
///
/// The core never persists transactions itself; whatever backs this trait
/// (an in-memory store, a REST API, a database) owns them. Failures here
/// are request-level: if the ledger cannot be read, the whole computation
/// aborts.
#[async_trait]
pub trait TransactionLedger: Send + Sync {
    /// All transactions for one portfolio, ordered ascending `(date, id)`.
    async fn list_transactions(&self, portfolio_id: Uuid)
        -> Result<Vec<Transaction>, CoreError>;
}

/// Supplies current and historical per-symbol prices.
///
/// A lookup the oracle cannot satisfy returns `PriceNotAvailable`; callers
/// treat that as non-fatal and flag the affected symbol or month instead
/// of aborting. Timeouts and retries are the implementation's concern —
/// the core only sees "a price" or "unavailable".
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Human-readable name of this oracle (for logs/errors).
    fn name(&self) -> &str;

    /// The latest known price for a symbol.
    async fn current_price(&self, symbol: &str) -> Result<f64, CoreError>;

    /// The price for a symbol at the end of a given calendar month.
    async fn price_at(&self, symbol: &str, year: i32, month: u32) -> Result<f64, CoreError>;
}

/// Maps portfolio ids to display names.
#[async_trait]
pub trait PortfolioRegistry: Send + Sync {
    async fn portfolio_name(&self, portfolio_id: Uuid) -> Result<String, CoreError>;
}
