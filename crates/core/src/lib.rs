pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;
use uuid::Uuid;

use errors::CoreError;
use models::diagnostic::Diagnostic;
use models::holding::HoldingsReport;
use models::performance::PerformanceReport;
use models::transaction::{Currency, Transaction};
use providers::traits::{PortfolioRegistry, PriceOracle, TransactionLedger};
use services::holdings_service::HoldingsService;
use services::performance_service::PerformanceService;
use services::price_service::PriceService;

/// Main entry point for the Portfolio Tracker core library.
///
/// Wires the three external collaborators — transaction ledger, price
/// oracle, portfolio registry — to the pure computation services. Both
/// queries are read-only and side-effect-free: transactions and prices are
/// fetched fresh, computed over, and nothing is cached between calls.
/// The tracker is `Send + Sync`; concurrent queries for the same or
/// different portfolios need no coordination.
#[must_use]
pub struct PortfolioTracker {
    ledger: Arc<dyn TransactionLedger>,
    oracle: Arc<dyn PriceOracle>,
    registry: Arc<dyn PortfolioRegistry>,
    holdings_service: HoldingsService,
    performance_service: PerformanceService,
    price_service: PriceService,
}

impl std::fmt::Debug for PortfolioTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioTracker")
            .field("oracle", &self.oracle.name())
            .finish()
    }
}

impl PortfolioTracker {
    pub fn new(
        ledger: Arc<dyn TransactionLedger>,
        oracle: Arc<dyn PriceOracle>,
        registry: Arc<dyn PortfolioRegistry>,
    ) -> Self {
        Self {
            ledger,
            oracle,
            registry,
            holdings_service: HoldingsService::new(),
            performance_service: PerformanceService::new(),
            price_service: PriceService::new(),
        }
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Current holdings for a portfolio: one valued entry per symbol,
    /// plus per-symbol diagnostics.
    ///
    /// Recomputed from the ledger on every call. Symbols the oracle cannot
    /// price are flagged, not dropped. Only a ledger failure or malformed
    /// ledger data aborts the request.
    pub async fn get_holdings(&self, portfolio_id: Uuid) -> Result<HoldingsReport, CoreError> {
        let transactions = self.ledger.list_transactions(portfolio_id).await?;
        validate_batch(&transactions)?;

        let mut diagnostics = currency_diagnostics(&transactions);

        let symbols: BTreeSet<String> =
            transactions.iter().map(|tx| tx.symbol.clone()).collect();
        debug!(
            "computing holdings for {portfolio_id}: {} transactions, {} symbols",
            transactions.len(),
            symbols.len()
        );
        let prices = self
            .price_service
            .current_prices(self.oracle.as_ref(), &symbols)
            .await;

        // Two-stage pipeline: replay transactions into lot holdings, then
        // combine lots per symbol.
        let outcome = self.holdings_service.aggregate(&transactions, &prices);
        let holdings = self.holdings_service.combine(&outcome.holdings);
        diagnostics.extend(outcome.diagnostics);

        Ok(HoldingsReport {
            holdings,
            diagnostics,
        })
    }

    // ── Monthly performance ─────────────────────────────────────────

    /// Monthly performance series from the first transaction through the
    /// current month.
    pub async fn get_monthly_performance(
        &self,
        portfolio_id: Uuid,
    ) -> Result<PerformanceReport, CoreError> {
        self.get_monthly_performance_as_of(portfolio_id, chrono::Utc::now().date_naive())
            .await
    }

    /// Monthly performance series through an explicit `as_of` date.
    ///
    /// Deterministic for fixed inputs; `get_monthly_performance` is this
    /// with `as_of` = today.
    pub async fn get_monthly_performance_as_of(
        &self,
        portfolio_id: Uuid,
        as_of: NaiveDate,
    ) -> Result<PerformanceReport, CoreError> {
        let transactions = self.ledger.list_transactions(portfolio_id).await?;
        validate_batch(&transactions)?;

        let mut diagnostics = currency_diagnostics(&transactions);

        let requirements = self
            .performance_service
            .price_requirements(&transactions, as_of);
        debug!(
            "building monthly series for {portfolio_id}: {} transactions, {} price lookups",
            transactions.len(),
            requirements.len()
        );
        let prices = self
            .price_service
            .monthly_prices(self.oracle.as_ref(), &requirements)
            .await;

        let outcome = self
            .performance_service
            .build_series(&transactions, &prices, as_of);
        diagnostics.extend(outcome.diagnostics);

        Ok(PerformanceReport {
            series: outcome.series,
            diagnostics,
        })
    }

    // ── Registry ────────────────────────────────────────────────────

    /// Display name for a portfolio id.
    pub async fn portfolio_name(&self, portfolio_id: Uuid) -> Result<String, CoreError> {
        self.registry.portfolio_name(portfolio_id).await
    }
}

/// Reject a ledger batch containing malformed transactions. Bad data at
/// this level means the ledger itself is broken, so the request aborts
/// rather than guessing.
fn validate_batch(transactions: &[Transaction]) -> Result<(), CoreError> {
    for tx in transactions {
        tx.validate()?;
    }
    Ok(())
}

/// A portfolio mixing transaction currencies gets one diagnostic; sums are
/// reported without conversion.
fn currency_diagnostics(transactions: &[Transaction]) -> Vec<Diagnostic> {
    let currencies: BTreeSet<Currency> = transactions.iter().map(|tx| tx.currency).collect();
    if currencies.len() > 1 {
        vec![Diagnostic::MixedCurrencies {
            currencies: currencies.into_iter().collect(),
        }]
    } else {
        Vec::new()
    }
}
