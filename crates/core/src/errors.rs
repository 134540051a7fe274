use thiserror::Error;
use uuid::Uuid;

/// Unified error type for the entire portfolio-tracker-core library.
/// Every public function returns `Result<T, CoreError>`.
///
/// Only request-level failures surface here: the ledger cannot be reached,
/// the ledger returned malformed data, or a portfolio does not exist.
/// Per-symbol and per-month findings travel as
/// [`Diagnostic`](crate::models::diagnostic::Diagnostic)s alongside results.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Business Logic ──────────────────────────────────────────────
    #[error("Transaction validation failed: {0}")]
    Validation(String),

    #[error("Insufficient holdings to sell {requested} {symbol} (held: {held})")]
    InsufficientHoldings {
        symbol: String,
        requested: u32,
        held: u32,
    },

    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    #[error("Portfolio not found: {0}")]
    PortfolioNotFound(Uuid),

    #[error("Price not available for {symbol} ({period})")]
    PriceNotAvailable { symbol: String, period: String },

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api { provider: String, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs to prevent
        // credential leakage. reqwest errors often contain full URLs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
