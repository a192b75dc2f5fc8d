//! Domain Models
//!
//! The per-conversation session and the small value types derived from it.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!

use agent_core::Conversation;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{HedgeError, Result};

/// Position in the fixed conversational sequence
///
/// Serialized as its step number so stored sessions stay readable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Step {
    /// Fresh session that has not been greeted yet; behaves like `Symbol`
    #[default]
    New,
    /// Awaiting the ticker symbol
    Symbol,
    /// Awaiting the share count
    Shares,
    /// Awaiting the dollar loss tolerance
    LossTolerance,
    /// Awaiting the hedge duration in weeks
    Duration,
    /// Awaiting the chosen expiration date
    Expiration,
    /// Awaiting the reason for hedging
    Reason,
    /// Awaiting the strike price
    Strike,
    /// Awaiting yes/no on proceeding
    Decision,
    /// Awaiting a follow-up question
    Question,
}

impl Step {
    pub const fn number(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Symbol => 1,
            Self::Shares => 2,
            Self::LossTolerance => 3,
            Self::Duration => 4,
            Self::Expiration => 5,
            Self::Reason => 6,
            Self::Strike => 7,
            Self::Decision => 8,
            Self::Question => 9,
        }
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step.number()
    }
}

impl TryFrom<u8> for Step {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::New,
            1 => Self::Symbol,
            2 => Self::Shares,
            3 => Self::LossTolerance,
            4 => Self::Duration,
            5 => Self::Expiration,
            6 => Self::Reason,
            7 => Self::Strike,
            8 => Self::Decision,
            9 => Self::Question,
            other => return Err(format!("unknown step {other}")),
        })
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Market outlook stated by the user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
}

impl Sentiment {
    /// Naive classification: any mention of "bullish" counts, case-insensitively
    pub fn from_reason(reason: &str) -> Self {
        if reason.to_lowercase().contains("bullish") {
            Self::Bullish
        } else {
            Self::Bearish
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
        }
    }
}

/// Option leg used for the hedge
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl From<Sentiment> for OptionType {
    fn from(sentiment: Sentiment) -> Self {
        match sentiment {
            Sentiment::Bullish => Self::Call,
            Sentiment::Bearish => Self::Put,
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// Last traded premiums at one strike; `None` means no contract, not zero
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Premiums {
    pub call: Option<Decimal>,
    pub put: Option<Decimal>,
}

impl Premiums {
    /// Cost of covering `shares` with both legs
    ///
    /// Both premiums are summed whatever option type was chosen; a missing
    /// leg contributes nothing.
    pub fn total_cost(&self, shares: u32) -> Decimal {
        let shares = Decimal::from(shares);
        self.call.unwrap_or(Decimal::ZERO) * shares + self.put.unwrap_or(Decimal::ZERO) * shares
    }
}

/// State of one hedge-building conversation
///
/// Optional fields are filled in by the step named in their doc and read back
/// through accessors that fail with [`HedgeError::MissingField`] if a later
/// step finds them empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HedgeSession {
    pub step: Step,

    /// Every successful user and assistant turn, in order
    pub transcript: Conversation,

    /// Uppercased ticker (step 1)
    pub symbol: Option<String>,

    /// Price at the time the symbol was accepted (step 1)
    pub current_price: Option<Decimal>,

    /// Shares held (step 2)
    pub num_shares: Option<u32>,

    /// Dollars the user is willing to lose (step 3); advisory context only
    pub loss_aversion: Option<Decimal>,

    /// Hedge length in weeks (step 4)
    pub hedge_duration_weeks: Option<u32>,

    /// Candidate expirations offered at step 4
    #[serde(default)]
    pub expiration_dates: Vec<NaiveDate>,

    /// Expiration picked by the user (step 5), not checked against the offer
    pub expiration_date: Option<String>,

    /// Free-text hedging reason (step 6)
    pub hedging_reason: Option<String>,

    /// Outlook derived from the reason (step 6)
    pub sentiment: Option<Sentiment>,

    /// Advisory strike suggestion or its error text (step 6)
    pub suggested_strike_price: Option<String>,

    /// Strike chosen by the user (step 7)
    pub strike_price: Option<Decimal>,

    /// Leg implied by the sentiment (step 7)
    pub option_type: Option<OptionType>,

    /// Looked-up premiums (step 7)
    #[serde(default)]
    pub premiums: Premiums,

    /// Both-legs premium cost (step 7)
    pub total_cost: Option<Decimal>,
}

impl HedgeSession {
    /// Session that has not been greeted yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Freshly greeted session awaiting the symbol
    pub fn started() -> Self {
        Self {
            step: Step::Symbol,
            ..Self::default()
        }
    }

    fn missing(&self, field: &'static str) -> HedgeError {
        HedgeError::MissingField { step: self.step.number(), field }
    }

    pub fn symbol(&self) -> Result<&str> {
        self.symbol.as_deref().ok_or_else(|| self.missing("symbol"))
    }

    pub fn current_price(&self) -> Result<Decimal> {
        self.current_price.ok_or_else(|| self.missing("current_price"))
    }

    pub fn num_shares(&self) -> Result<u32> {
        self.num_shares.ok_or_else(|| self.missing("num_shares"))
    }

    pub fn expiration_date(&self) -> Result<&str> {
        self.expiration_date.as_deref().ok_or_else(|| self.missing("expiration_date"))
    }

    pub fn sentiment(&self) -> Result<Sentiment> {
        self.sentiment.ok_or_else(|| self.missing("sentiment"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_step_numbers_round_trip() {
        for n in 0..=9u8 {
            let step = Step::try_from(n).unwrap();
            assert_eq!(u8::from(step), n);
        }
        assert!(Step::try_from(10).is_err());
    }

    #[test]
    fn test_step_serializes_as_number() {
        let json = serde_json::to_string(&Step::Strike).unwrap();
        assert_eq!(json, "7");
        let step: Step = serde_json::from_str("9").unwrap();
        assert_eq!(step, Step::Question);
    }

    #[test]
    fn test_sentiment_is_substring_match() {
        assert_eq!(Sentiment::from_reason("I'm not bullish at all"), Sentiment::Bullish);
        assert_eq!(Sentiment::from_reason("Very BULLISH long term"), Sentiment::Bullish);
        assert_eq!(Sentiment::from_reason("earnings risk"), Sentiment::Bearish);
        assert_eq!(Sentiment::from_reason(""), Sentiment::Bearish);
    }

    #[test]
    fn test_option_type_follows_sentiment() {
        assert_eq!(OptionType::from(Sentiment::Bullish), OptionType::Call);
        assert_eq!(OptionType::from(Sentiment::Bearish), OptionType::Put);
    }

    #[test]
    fn test_total_cost_sums_both_legs() {
        let call_only = Premiums { call: Some(dec!(2.5)), put: None };
        assert_eq!(call_only.total_cost(10), dec!(25.00));

        let both = Premiums { call: Some(dec!(2.5)), put: Some(dec!(1.25)) };
        assert_eq!(both.total_cost(10), dec!(37.5));

        assert_eq!(Premiums::default().total_cost(100), Decimal::ZERO);
    }

    #[test]
    fn test_missing_field_reports_step() {
        let session = HedgeSession::started();
        let err = session.num_shares().unwrap_err();
        assert!(matches!(err, HedgeError::MissingField { step: 1, field: "num_shares" }));
    }
}
