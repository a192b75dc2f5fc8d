//! # hedge-advisor
//!
//! Conversational wizard that walks a stock holder through building an
//! options hedge, one answer per turn.
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  symbol → shares → loss tolerance → weeks → expiration            │
//! │         → reason (bullish / bearish) → strike → proceed? (yes/no) │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  price lookup ........ MarketDataClient::get_current_price       │
//! │  expiration window ... MarketDataClient::get_expiration_dates    │
//! │  premiums ............ MarketDataClient::get_premiums            │
//! │  strike / sizing / Q&A Advisor::ask (full transcript)            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The wizard is stateless: every turn takes a [`HedgeSession`] and returns
//! the next one, so callers own persistence (see
//! [`agent_core::SessionStore`]).

pub mod error;
pub mod market;
pub mod model;
pub mod prompts;
pub mod validation;
pub mod wizard;

pub use error::{HedgeError, Result};
pub use market::{MarketDataClient, MockMarketData, YahooConfig, YahooFinanceClient};
pub use model::{HedgeSession, OptionType, Premiums, Sentiment, Step};
pub use prompts::HEDGE_ADVISOR_PROMPT;
pub use validation::ValidationError;
pub use wizard::{HedgeWizard, Reply, Turn, WizardConfig};
