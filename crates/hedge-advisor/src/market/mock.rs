//! Mock Market Data
//!
//! For testing and demo purposes. Serves quotes, expirations and chains from
//! in-memory tables.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{MarketDataClient, OptionChain, OptionContract};
use crate::error::{HedgeError, Result};

/// Mock market data source
#[derive(Clone, Debug, Default)]
pub struct MockMarketData {
    quotes: HashMap<String, Decimal>,
    expirations: HashMap<String, Vec<NaiveDate>>,
    chains: HashMap<(String, NaiveDate), OptionChain>,
    /// Fail every request, as if the upstream were down
    outage: bool,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeded with a handful of large caps and weekly expirations after `today`
    pub fn demo(today: NaiveDate) -> Self {
        let listings = [
            ("AAPL", dec!(227.50)),
            ("MSFT", dec!(418.20)),
            ("META", dec!(585.00)),
            ("GOOG", dec!(165.30)),
            ("NVDA", dec!(138.00)),
            ("TSLA", dec!(250.00)),
        ];

        let fridays = upcoming_fridays(today, 12);
        let mut market = Self::new();

        for (symbol, price) in listings {
            market = market
                .with_quote(symbol, price)
                .with_expirations(symbol, fridays.clone());
            for (weeks_out, expiration) in (1u32..).zip(&fridays) {
                market = market.with_chain(symbol, synthetic_chain(price, *expiration, weeks_out));
            }
        }

        market
    }

    #[must_use]
    pub fn with_quote(mut self, symbol: &str, price: Decimal) -> Self {
        self.quotes.insert(symbol.to_uppercase(), price);
        self
    }

    #[must_use]
    pub fn with_expirations(mut self, symbol: &str, mut dates: Vec<NaiveDate>) -> Self {
        dates.sort_unstable();
        self.expirations.insert(symbol.to_uppercase(), dates);
        self
    }

    #[must_use]
    pub fn with_chain(mut self, symbol: &str, chain: OptionChain) -> Self {
        self.chains.insert((symbol.to_uppercase(), chain.expiration), chain);
        self
    }

    #[must_use]
    pub const fn with_outage(mut self) -> Self {
        self.outage = true;
        self
    }

    fn check_outage(&self) -> Result<()> {
        if self.outage {
            Err(HedgeError::MarketData("simulated outage".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MarketDataClient for MockMarketData {
    async fn get_current_price(&self, symbol: &str) -> Result<Decimal> {
        self.check_outage()?;
        self.quotes
            .get(&symbol.to_uppercase())
            .copied()
            .ok_or_else(|| HedgeError::PriceUnavailable(symbol.to_string()))
    }

    async fn list_expirations(&self, symbol: &str) -> Result<Vec<NaiveDate>> {
        self.check_outage()?;
        Ok(self.expirations.get(&symbol.to_uppercase()).cloned().unwrap_or_default())
    }

    async fn get_option_chain(&self, symbol: &str, expiration: &str) -> Result<OptionChain> {
        self.check_outage()?;
        let unavailable = || HedgeError::ChainUnavailable {
            symbol: symbol.to_string(),
            expiration: expiration.to_string(),
        };

        let date = NaiveDate::parse_from_str(expiration.trim(), "%Y-%m-%d")
            .map_err(|_| unavailable())?;

        self.chains
            .get(&(symbol.to_uppercase(), date))
            .cloned()
            .ok_or_else(unavailable)
    }

    async fn health_check(&self) -> bool {
        !self.outage
    }

    fn name(&self) -> &str {
        "MockMarketData"
    }
}

fn upcoming_fridays(today: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let days_ahead = (7 + Weekday::Fri.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
    let first = today + Duration::days(i64::from(if days_ahead == 0 { 7 } else { days_ahead }));
    (0..count)
        .map_while(|i| {
            let offset = Duration::weeks(i64::try_from(i).ok()?);
            first.checked_add_signed(offset)
        })
        .collect()
}

/// Intrinsic value plus a flat half-percent of spot per week of time value
fn synthetic_chain(spot: Decimal, expiration: NaiveDate, weeks_out: u32) -> OptionChain {
    let step = dec!(5);
    let center = (spot / step).round() * step;
    let time_value = spot * dec!(0.005) * Decimal::from(weeks_out);

    let strikes: Vec<Decimal> = (-5i32..=5).map(|i| center + step * Decimal::from(i)).collect();

    let contract = |strike: Decimal, intrinsic: Decimal| OptionContract {
        strike,
        last_price: (intrinsic.max(Decimal::ZERO) + time_value).round_dp(2),
    };

    OptionChain {
        expiration,
        calls: strikes.iter().map(|&k| contract(k, spot - k)).collect(),
        puts: strikes.iter().map(|&k| contract(k, k - spot)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_quotes() {
        let market = MockMarketData::new().with_quote("aapl", dec!(227.50));

        assert_eq!(market.get_current_price("AAPL").await.unwrap(), dec!(227.50));
        assert!(matches!(
            market.get_current_price("NOTREAL").await,
            Err(HedgeError::PriceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_outage_fails_everything() {
        let market = MockMarketData::demo(date(2026, 10, 19)).with_outage();
        assert!(market.get_current_price("AAPL").await.is_err());
        assert!(market.list_expirations("AAPL").await.is_err());
        assert!(!market.health_check().await);
        // The windowed lookup swallows the failure
        assert!(market.get_expiration_dates("AAPL", date(2026, 11, 9), 2).await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_expiration_gives_absent_premiums() {
        let market = MockMarketData::demo(date(2026, 10, 19));
        let premiums = market.get_premiums("AAPL", "not-a-date", dec!(225)).await.unwrap();
        assert_eq!(premiums.call, None);
        assert_eq!(premiums.put, None);
    }

    #[tokio::test]
    async fn test_demo_chain_has_listed_strikes() {
        let market = MockMarketData::demo(date(2026, 10, 19));
        let expirations = market.list_expirations("AAPL").await.unwrap();

        assert_eq!(expirations.len(), 12);
        assert_eq!(expirations[0], date(2026, 10, 23));

        let premiums = market.get_premiums("AAPL", "2026-10-23", dec!(225)).await.unwrap();
        assert!(premiums.call.is_some());
        assert!(premiums.put.is_some());
        assert!(premiums.call.unwrap() > premiums.put.unwrap());
    }

    #[test]
    fn test_upcoming_fridays_skips_today() {
        let friday = date(2026, 10, 23);
        assert_eq!(upcoming_fridays(friday, 2), vec![date(2026, 10, 30), date(2026, 11, 6)]);
    }
}
