//! Input Validation
//!
//! Each parser turns raw user text into a validated value or a
//! [`ValidationError`] whose `Display` is the correction shown to the user.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// A rejected answer; the step does not advance and nothing is recorded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("The stock symbol is invalid. Please enter a valid stock symbol.")]
    InvalidSymbol,

    #[error("Please enter a valid number of shares.")]
    InvalidShares,

    #[error("Please enter a valid amount.")]
    InvalidAmount,

    #[error("Please enter a valid number of weeks.")]
    InvalidWeeks,

    #[error("Please enter a valid numeric value for the strike price.")]
    InvalidStrike,

    #[error("Option premiums could not be retrieved right now. Please enter the strike price again.")]
    PremiumsUnavailable,
}

/// The user's answer at the yes/no decision step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Yes,
    No,
    /// Anything else; handled the same as `No`
    Other,
}

impl Decision {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.eq_ignore_ascii_case("yes") {
            Self::Yes
        } else if input.eq_ignore_ascii_case("no") {
            Self::No
        } else {
            Self::Other
        }
    }
}

/// Ticker text, uppercased
///
/// Only the shape is checked here; the price lookup decides whether the
/// symbol actually trades.
pub fn parse_symbol(input: &str) -> Result<String, ValidationError> {
    let symbol = input.trim().to_uppercase();
    let well_formed = !symbol.is_empty()
        && symbol.len() <= 12
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));

    if well_formed { Ok(symbol) } else { Err(ValidationError::InvalidSymbol) }
}

fn parse_positive_int(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

fn parse_decimal(input: &str) -> Option<Decimal> {
    let input = input.trim().trim_start_matches('$').replace(',', "");
    Decimal::from_str(&input)
        .or_else(|_| Decimal::from_scientific(&input))
        .ok()
}

/// Number of shares held; a positive whole number
pub fn parse_shares(input: &str) -> Result<u32, ValidationError> {
    parse_positive_int(input).ok_or(ValidationError::InvalidShares)
}

/// Dollar loss tolerance; any non-negative amount
pub fn parse_amount(input: &str) -> Result<Decimal, ValidationError> {
    parse_decimal(input)
        .filter(|d| !d.is_sign_negative())
        .ok_or(ValidationError::InvalidAmount)
}

/// Hedge length in weeks; a positive whole number
pub fn parse_weeks(input: &str) -> Result<u32, ValidationError> {
    parse_positive_int(input).ok_or(ValidationError::InvalidWeeks)
}

/// Strike price; a positive amount
pub fn parse_strike(input: &str) -> Result<Decimal, ValidationError> {
    parse_decimal(input)
        .filter(|d| d.is_sign_positive() && !d.is_zero())
        .ok_or(ValidationError::InvalidStrike)
}
