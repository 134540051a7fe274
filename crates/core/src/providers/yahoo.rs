use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use time::OffsetDateTime;

use super::traits::PriceOracle;
use crate::errors::CoreError;
use crate::models::performance::MonthKey;

/// Yahoo Finance price oracle for equities and ETFs.
///
/// - **Free**: No API key required.
/// - **Coverage**: Global equities, ETFs, indices, mutual funds.
/// - **Data**: Real-time quotes + full historical OHLCV.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's public
/// endpoints. Month-end prices resolve to the last trading day's close of
/// that month (markets are shut on the actual month end often enough that
/// an exact-date lookup would fail spuriously).
pub struct YahooOracle {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooOracle {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }

    /// Convert a `chrono::NaiveDate` to `time::OffsetDateTime` (midnight UTC).
    fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, CoreError> {
        let month = time::Month::try_from(date.month() as u8).map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Invalid month in {date}: {e}"),
        })?;
        let odt = time::Date::from_calendar_date(date.year(), month, date.day() as u8)
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Invalid date {date}: {e}"),
            })?
            .midnight()
            .assume_utc();
        Ok(odt)
    }
}

#[async_trait]
impl PriceOracle for YahooOracle {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    async fn current_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch latest quote for {symbol}: {e}"),
            })?;

        let quote = resp.last_quote().map_err(|_| CoreError::PriceNotAvailable {
            symbol: symbol.to_string(),
            period: "current".into(),
        })?;

        Ok(quote.close)
    }

    async fn price_at(&self, symbol: &str, year: i32, month: u32) -> Result<f64, CoreError> {
        let key = MonthKey::new(year, month);
        let start = Self::to_offset_datetime(key.first_day())?;
        // End is exclusive-ish on Yahoo's side; pad a day past month end
        let end = Self::to_offset_datetime(key.last_day() + chrono::Duration::days(1))?;

        let resp = self
            .connector
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| CoreError::Api {
                provider: "Yahoo Finance".into(),
                message: format!("Failed to fetch history for {symbol} in {key}: {e}"),
            })?;

        let quotes = resp.quotes().map_err(|e| CoreError::Api {
            provider: "Yahoo Finance".into(),
            message: format!("Failed to parse quotes for {symbol}: {e}"),
        })?;

        // Last trading day of the month wins
        let quote = quotes
            .iter()
            .max_by_key(|q| q.timestamp)
            .ok_or_else(|| CoreError::PriceNotAvailable {
                symbol: symbol.to_string(),
                period: key.to_string(),
            })?;

        Ok(quote.close)
    }
}
