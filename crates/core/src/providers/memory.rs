use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use super::traits::{PortfolioRegistry, TransactionLedger};
use crate::errors::CoreError;
use crate::models::portfolio::Portfolio;
use crate::models::transaction::{Transaction, TransactionType};

/// In-memory transaction ledger and portfolio registry.
///
/// Backs tests and embedding consumers that have no external ledger.
/// Ingestion is where malformed data is rejected: a transaction must
/// validate, and a Sell may never drive a symbol's held quantity negative
/// at any point of the ledger — not at insertion time, and not for any
/// later Sell it would strand. Transactions are immutable once accepted;
/// deletion is the only mutation.
#[derive(Default)]
pub struct MemoryLedger {
    inner: RwLock<HashMap<Uuid, PortfolioEntry>>,
}

struct PortfolioEntry {
    name: String,
    /// Kept sorted ascending by `(date, id)`
    transactions: Vec<Transaction>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new, empty portfolio and return its id.
    pub fn add_portfolio(&self, name: impl Into<String>) -> Uuid {
        let portfolio = Portfolio::new(name);
        let id = portfolio.id;
        self.write().insert(
            id,
            PortfolioEntry {
                name: portfolio.name,
                transactions: Vec::new(),
            },
        );
        id
    }

    /// Ingest a transaction.
    ///
    /// Validates the transaction itself, then — for a Sell, or for any
    /// insertion dated into the past — that the ledger still replays
    /// without a negative quantity for that symbol. A transaction that
    /// would break the ledger is rejected and not stored.
    pub fn add_transaction(&self, transaction: Transaction) -> Result<Uuid, CoreError> {
        transaction.validate()?;
        let id = transaction.id;
        let symbol = transaction.symbol.clone();

        let mut inner = self.write();
        let entry = inner
            .get_mut(&transaction.portfolio_id)
            .ok_or(CoreError::PortfolioNotFound(transaction.portfolio_id))?;

        let pos = entry
            .transactions
            .partition_point(|t| t.sort_key() <= transaction.sort_key());
        entry.transactions.insert(pos, transaction);

        if let Err(e) = check_symbol_consistency(&entry.transactions, &symbol) {
            entry.transactions.remove(pos);
            return Err(e);
        }
        Ok(id)
    }

    /// Delete a transaction by id.
    ///
    /// Removing a Buy re-validates the symbol's replay: a removal that
    /// would strand a later Sell is rolled back and rejected.
    pub fn remove_transaction(
        &self,
        portfolio_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<(), CoreError> {
        let mut inner = self.write();
        let entry = inner
            .get_mut(&portfolio_id)
            .ok_or(CoreError::PortfolioNotFound(portfolio_id))?;

        let idx = entry
            .transactions
            .iter()
            .position(|t| t.id == transaction_id)
            .ok_or(CoreError::TransactionNotFound(transaction_id))?;
        let removed = entry.transactions.remove(idx);

        if removed.transaction_type == TransactionType::Buy {
            if let Err(e) = check_symbol_consistency(&entry.transactions, &removed.symbol) {
                entry.transactions.insert(idx, removed);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Snapshot of a portfolio's transactions, ordered `(date, id)`.
    pub fn transactions(&self, portfolio_id: Uuid) -> Result<Vec<Transaction>, CoreError> {
        let inner = self.read();
        let entry = inner
            .get(&portfolio_id)
            .ok_or(CoreError::PortfolioNotFound(portfolio_id))?;
        Ok(entry.transactions.clone())
    }

    fn read(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, PortfolioEntry>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, PortfolioEntry>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Replay one symbol's transactions (already sorted) and verify no Sell
/// exceeds the quantity held at its point in the sequence.
fn check_symbol_consistency(
    transactions: &[Transaction],
    symbol: &str,
) -> Result<(), CoreError> {
    let mut held: u32 = 0;
    for tx in transactions.iter().filter(|t| t.symbol == symbol) {
        match tx.transaction_type {
            TransactionType::Buy => held += tx.quantity,
            TransactionType::Sell => {
                if tx.quantity > held {
                    return Err(CoreError::InsufficientHoldings {
                        symbol: symbol.to_string(),
                        requested: tx.quantity,
                        held,
                    });
                }
                held -= tx.quantity;
            }
        }
    }
    Ok(())
}

#[async_trait]
impl TransactionLedger for MemoryLedger {
    async fn list_transactions(
        &self,
        portfolio_id: Uuid,
    ) -> Result<Vec<Transaction>, CoreError> {
        self.transactions(portfolio_id)
    }
}

#[async_trait]
impl PortfolioRegistry for MemoryLedger {
    async fn portfolio_name(&self, portfolio_id: Uuid) -> Result<String, CoreError> {
        let inner = self.read();
        inner
            .get(&portfolio_id)
            .map(|entry| entry.name.clone())
            .ok_or(CoreError::PortfolioNotFound(portfolio_id))
    }
}
