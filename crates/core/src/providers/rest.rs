use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use uuid::Uuid;

use super::traits::{PortfolioRegistry, TransactionLedger};
use crate::errors::CoreError;
use crate::models::transaction::{Currency, Transaction, TransactionType};

const PROVIDER: &str = "Portfolio API";

/// REST client for a portfolio management API that serves the transaction
/// ledger and the portfolio registry.
///
/// Endpoints:
/// - `GET {base}/investments/{id}/investments_by_portfolio/` — the ledger
/// - `GET {base}/portfolios/{id}/` — id → display name
///
/// Responses are mapped through wire DTOs and validated at ingestion;
/// malformed rows are rejected, never coerced.
pub struct RestLedger {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl RestLedger {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: None,
        }
    }

    /// Attach a bearer token sent with every request.
    pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut ledger = Self::new(base_url);
        ledger.bearer_token = Some(token.into());
        ledger
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let req = self.client.get(url);
        match &self.bearer_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

// ── Wire DTOs ───────────────────────────────────────────────────────

/// Decimal fields arrive as JSON strings ("123.45") from the API but as
/// numbers from test fixtures; accept both.
fn decimal_field<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Deserialize)]
struct InvestmentDto {
    id: Uuid,
    portfolio: Uuid,
    symbol: String,
    quantity: u32,
    transaction_type: TransactionType,
    #[serde(deserialize_with = "decimal_field")]
    price: f64,
    date: NaiveDate,
    currency: Currency,
}

impl InvestmentDto {
    fn into_transaction(self) -> Result<Transaction, CoreError> {
        let tx = Transaction {
            id: self.id,
            portfolio_id: self.portfolio,
            symbol: self.symbol.to_uppercase(),
            quantity: self.quantity,
            transaction_type: self.transaction_type,
            unit_price: self.price,
            date: self.date,
            currency: self.currency,
        };
        tx.validate()?;
        Ok(tx)
    }
}

#[derive(Debug, Deserialize)]
struct PortfolioDto {
    #[allow(dead_code)]
    id: Uuid,
    name: String,
}

#[async_trait]
impl TransactionLedger for RestLedger {
    async fn list_transactions(
        &self,
        portfolio_id: Uuid,
    ) -> Result<Vec<Transaction>, CoreError> {
        let url = format!(
            "{}/investments/{portfolio_id}/investments_by_portfolio/",
            self.base_url
        );
        debug!("fetching ledger: {url}");

        let resp = self.get(&url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(CoreError::PortfolioNotFound(portfolio_id));
        }
        if !resp.status().is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Unexpected status {} listing transactions", resp.status()),
            });
        }

        let rows: Vec<InvestmentDto> = resp.json().await.map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse transaction list: {e}"),
        })?;

        let mut transactions = rows
            .into_iter()
            .map(InvestmentDto::into_transaction)
            .collect::<Result<Vec<_>, _>>()?;
        transactions.sort_by_key(Transaction::sort_key);
        Ok(transactions)
    }
}

#[async_trait]
impl PortfolioRegistry for RestLedger {
    async fn portfolio_name(&self, portfolio_id: Uuid) -> Result<String, CoreError> {
        let url = format!("{}/portfolios/{portfolio_id}/", self.base_url);

        let resp = self.get(&url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(CoreError::PortfolioNotFound(portfolio_id));
        }
        if !resp.status().is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Unexpected status {} fetching portfolio", resp.status()),
            });
        }

        let dto: PortfolioDto = resp.json().await.map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse portfolio: {e}"),
        })?;
        Ok(dto.name)
    }
}
