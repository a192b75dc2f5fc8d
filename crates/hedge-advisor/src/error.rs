//! Error Types for the Hedge Advisor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HedgeError>;

#[derive(Error, Debug)]
pub enum HedgeError {
    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("Price unavailable for {0}")]
    PriceUnavailable(String),

    #[error("No option chain for {symbol} expiring {expiration}")]
    ChainUnavailable {
        symbol: String,
        expiration: String,
    },

    #[error("Market data request timed out after {0}s")]
    Timeout(u64),

    #[error("Session is at step {step} but {field} was never recorded")]
    MissingField {
        step: u8,
        field: &'static str,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
