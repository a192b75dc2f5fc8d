//! Yahoo Finance Client
//!
//! Reads quotes, expirations and chains from the public options endpoint:
//! `GET /v7/finance/options/{symbol}` and `.../{symbol}?date={unix}`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{MarketDataClient, OptionChain, OptionContract};
use crate::error::{HedgeError, Result};

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

#[derive(Clone, Debug)]
pub struct YahooConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: Duration::from_secs(15),
        }
    }
}

pub struct YahooFinanceClient {
    client: Client,
    config: YahooConfig,
}

impl YahooFinanceClient {
    pub fn new(config: YahooConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("hedge-advisor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self, symbol: &str) -> String {
        format!(
            "{}/v7/finance/options/{}",
            self.config.base_url.trim_end_matches('/'),
            symbol.to_uppercase()
        )
    }

    async fn fetch(&self, symbol: &str, date: Option<i64>) -> Result<OptionsResult> {
        let mut request = self.client.get(self.url(symbol));
        if let Some(date) = date {
            request = request.query(&[("date", date)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let err = status_error(symbol, status);
            tracing::warn!(symbol, status = status.as_u16(), error = %err, "Yahoo Finance request failed");
            return Err(err);
        }

        let body: OptionsEnvelope = response.json().await?;
        body.into_result(symbol)
    }
}

#[async_trait]
impl MarketDataClient for YahooFinanceClient {
    async fn get_current_price(&self, symbol: &str) -> Result<Decimal> {
        self.fetch(symbol, None)
            .await?
            .quote
            .and_then(|q| q.regular_market_price)
            .ok_or_else(|| HedgeError::PriceUnavailable(symbol.to_string()))
    }

    async fn list_expirations(&self, symbol: &str) -> Result<Vec<NaiveDate>> {
        let result = self.fetch(symbol, None).await?;
        let mut dates: Vec<NaiveDate> = result
            .expiration_dates
            .into_iter()
            .filter_map(unix_to_date)
            .collect();
        dates.sort_unstable();
        dates.dedup();
        Ok(dates)
    }

    async fn get_option_chain(&self, symbol: &str, expiration: &str) -> Result<OptionChain> {
        let unavailable = || HedgeError::ChainUnavailable {
            symbol: symbol.to_string(),
            expiration: expiration.to_string(),
        };

        let date = NaiveDate::parse_from_str(expiration.trim(), "%Y-%m-%d")
            .map_err(|_| unavailable())?;
        let unix = date_to_unix(date).ok_or_else(unavailable)?;

        let result = self.fetch(symbol, Some(unix)).await?;
        let options = result
            .options
            .into_iter()
            .find(|o| o.expiration_date.and_then(unix_to_date) == Some(date))
            .ok_or_else(unavailable)?;

        Ok(OptionChain {
            expiration: date,
            calls: options.calls.into_iter().filter_map(RawContract::into_contract).collect(),
            puts: options.puts.into_iter().filter_map(RawContract::into_contract).collect(),
        })
    }

    async fn health_check(&self) -> bool {
        self.get_current_price("SPY").await.is_ok()
    }

    fn name(&self) -> &str {
        "YahooFinance"
    }
}

/// 404 means the symbol is not listed; anything else is an upstream fault
fn status_error(symbol: &str, status: StatusCode) -> HedgeError {
    match status {
        StatusCode::NOT_FOUND => HedgeError::PriceUnavailable(symbol.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HedgeError::MarketData(format!(
            "HTTP {status}: Yahoo Finance rejected the request (cookie/crumb required)"
        )),
        StatusCode::TOO_MANY_REQUESTS => {
            HedgeError::MarketData(format!("HTTP {status}: rate limited by Yahoo Finance"))
        }
        _ => HedgeError::MarketData(format!("HTTP {status} for {symbol}")),
    }
}

fn unix_to_date(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

fn date_to_unix(date: NaiveDate) -> Option<i64> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

// Wire types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsEnvelope {
    option_chain: OptionsBody,
}

impl OptionsEnvelope {
    fn into_result(self, symbol: &str) -> Result<OptionsResult> {
        if let Some(error) = self.option_chain.error {
            let description = error.description.unwrap_or_else(|| "unknown error".into());
            tracing::warn!(symbol, error = %description, "Yahoo Finance returned an error body");
            return Err(HedgeError::MarketData(format!("{symbol}: {description}")));
        }
        self.option_chain
            .result
            .into_iter()
            .next()
            .ok_or_else(|| HedgeError::PriceUnavailable(symbol.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct OptionsBody {
    #[serde(default)]
    result: Vec<OptionsResult>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResult {
    #[serde(default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    quote: Option<RawQuote>,
    #[serde(default)]
    options: Vec<RawOptions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuote {
    #[serde(default)]
    regular_market_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOptions {
    #[serde(default)]
    expiration_date: Option<i64>,
    #[serde(default)]
    calls: Vec<RawContract>,
    #[serde(default)]
    puts: Vec<RawContract>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContract {
    strike: Option<Decimal>,
    last_price: Option<Decimal>,
}

impl RawContract {
    fn into_contract(self) -> Option<OptionContract> {
        Some(OptionContract {
            strike: self.strike?,
            last_price: self.last_price?,
        })
    }
}
