//! Market Data Integration
//!
//! Abstractions and implementations for quote and option-chain sources.

mod mock;
mod yahoo;

pub use mock::MockMarketData;
pub use yahoo::{YahooConfig, YahooFinanceClient};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{HedgeError, Result};
use crate::model::Premiums;

/// A single listed option contract
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionContract {
    pub strike: Decimal,
    pub last_price: Decimal,
}

/// Calls and puts for one expiration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionChain {
    pub expiration: NaiveDate,
    pub calls: Vec<OptionContract>,
    pub puts: Vec<OptionContract>,
}

impl OptionChain {
    /// Premiums at exactly `strike`; a leg with no such contract is `None`
    pub fn premiums_at(&self, strike: Decimal) -> Premiums {
        let find = |legs: &[OptionContract]| {
            legs.iter().find(|c| c.strike == strike).map(|c| c.last_price)
        };
        Premiums {
            call: find(&self.calls),
            put: find(&self.puts),
        }
    }
}

/// Keep the dates within `weeks_range` weeks either side of `target`, inclusive
pub fn dates_within(dates: &[NaiveDate], target: NaiveDate, weeks_range: u32) -> Vec<NaiveDate> {
    let window = Duration::weeks(i64::from(weeks_range));
    let (Some(start), Some(end)) = (
        target.checked_sub_signed(window),
        target.checked_add_signed(window),
    ) else {
        return Vec::new();
    };

    dates
        .iter()
        .copied()
        .filter(|d| (start..=end).contains(d))
        .collect()
}

/// Market data client trait (Strategy pattern)
///
/// Implement this for each data source: Yahoo Finance, a broker API, a mock.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Current tradable price; fails when the symbol has none
    async fn get_current_price(&self, symbol: &str) -> Result<Decimal>;

    /// Every expiration the instrument publishes, ascending
    async fn list_expirations(&self, symbol: &str) -> Result<Vec<NaiveDate>>;

    /// Option chain for one expiration
    ///
    /// Fails with [`HedgeError::ChainUnavailable`] when nothing is listed for
    /// that date.
    async fn get_option_chain(&self, symbol: &str, expiration: &str) -> Result<OptionChain>;

    /// Published expirations within `weeks_range` weeks of `target`
    ///
    /// Never fails: lookup errors are logged and yield no dates.
    async fn get_expiration_dates(
        &self,
        symbol: &str,
        target: NaiveDate,
        weeks_range: u32,
    ) -> Vec<NaiveDate> {
        match self.list_expirations(symbol).await {
            Ok(dates) => {
                if dates.is_empty() {
                    tracing::info!(symbol, "No expiration dates published");
                }
                dates_within(&dates, target, weeks_range)
            }
            Err(e) => {
                tracing::warn!(symbol, error = %e, "Failed to fetch expiration dates");
                Vec::new()
            }
        }
    }

    /// Call and put premiums at an exact strike
    ///
    /// An expiration with no listed chain yields absent legs; transport
    /// failures are returned as errors.
    async fn get_premiums(
        &self,
        symbol: &str,
        expiration: &str,
        strike: Decimal,
    ) -> Result<Premiums> {
        match self.get_option_chain(symbol, expiration).await {
            Ok(chain) => Ok(chain.premiums_at(strike)),
            Err(HedgeError::ChainUnavailable { .. }) => {
                tracing::info!(symbol, expiration, "No option chain listed");
                Ok(Premiums::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Check if the source is reachable
    async fn health_check(&self) -> bool;

    /// Source name
    fn name(&self) -> &str;
}
