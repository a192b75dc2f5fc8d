//! Hedge Wizard
//!
//! The step-indexed conversation that builds a hedge one answer at a time.
//! [`HedgeWizard::advance`] takes the current session and the user's message
//! and returns the next session together with the reply to show.
//!
//! ```text
//!  1 symbol ─▶ 2 shares ─▶ 3 loss ─▶ 4 weeks ─▶ 5 expiration ─▶ 6 reason ─▶ 7 strike ─▶ 8 decision
//!                                                                                      ▲      │ no / other
//!                                                                                      └─ 9 ◀─┘
//! ```
//!
//! A rejected answer leaves the session exactly as it was. A successful turn
//! appends the user's message and the reply to the transcript, except at
//! step 4 where the date list is returned without recording the reply.
//! Failed advisory calls become the reply text and the step still advances.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use agent_core::Advisor;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{HedgeError, Result};
use crate::market::MarketDataClient;
use crate::model::{HedgeSession, OptionType, Sentiment, Step};
use crate::prompts;
use crate::validation::{self, Decision, ValidationError};


/// Wizard configuration
#[derive(Clone, Debug)]
pub struct WizardConfig {
    /// Weeks either side of the target date searched for expirations
    pub expiration_window_weeks: u32,

    /// Upper bound on a single market data round-trip
    pub market_timeout: Duration,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            expiration_window_weeks: 2,
            market_timeout: Duration::from_secs(20),
        }
    }
}

/// What the user sees after a turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    /// Expiration choices offered at step 4
    Dates { message: String, dates: Vec<String> },
    Text { message: String },
}

impl Reply {
    pub fn text(message: impl Into<String>) -> Self {
        Self::Text { message: message.into() }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Text { message } | Self::Dates { message, .. } => message,
        }
    }
}

/// Result of one `advance` call
#[derive(Clone, Debug)]
pub struct Turn {
    pub session: HedgeSession,
    pub reply: Reply,
}

/// How a step handler finished
enum Outcome {
    /// Advanced; reply is recorded in the transcript
    Reply(String),
    /// Advanced; structured reply returned without recording it
    Dates { message: String, dates: Vec<String> },
    /// Answer rejected; the session is left untouched
    Rejected(ValidationError),
}

/// The conversation state machine
#[derive(Clone)]
pub struct HedgeWizard {
    market: Arc<dyn MarketDataClient>,
    advisor: Advisor,
    config: WizardConfig,
}

impl HedgeWizard {
    pub fn new(market: Arc<dyn MarketDataClient>, advisor: Advisor, config: WizardConfig) -> Self {
        Self { market, advisor, config }
    }

    pub fn market(&self) -> &dyn MarketDataClient {
        self.market.as_ref()
    }

    pub const fn advisor(&self) -> &Advisor {
        &self.advisor
    }

    /// Opening message for a freshly started session
    pub fn welcome(&self) -> Turn {
        Turn {
            session: HedgeSession::started(),
            reply: Reply::text(prompts::WELCOME),
        }
    }

    /// Handle one user message against today's date
    pub async fn advance(&self, session: HedgeSession, message: &str) -> Result<Turn> {
        self.advance_on(session, message, Utc::now().date_naive()).await
    }

    /// Handle one user message, with `today` anchoring the duration step
    pub async fn advance_on(
        &self,
        session: HedgeSession,
        message: &str,
        today: NaiveDate,
    ) -> Result<Turn> {
        let step = session.step;
        let mut next = session.clone();
        next.transcript.push_user(message);

        let outcome = match step {
            Step::New | Step::Symbol => self.on_symbol(&mut next, message).await?,
            Step::Shares => Self::on_shares(&mut next, message)?,
            Step::LossTolerance => Self::on_loss_tolerance(&mut next, message),
            Step::Duration => self.on_duration(&mut next, message, today).await?,
            Step::Expiration => Self::on_expiration(&mut next, message)?,
            Step::Reason => self.on_reason(&mut next, message).await?,
            Step::Strike => self.on_strike(&mut next, message).await?,
            Step::Decision => Self::on_decision(&mut next, message),
            Step::Question => self.on_question(&mut next, message).await,
        };

        let turn = match outcome {
            Outcome::Rejected(reason) => {
                tracing::debug!(step = %step, reason = %reason, "Answer rejected");
                return Ok(Turn { session, reply: Reply::text(reason.to_string()) });
            }
            Outcome::Dates { message, dates } => Turn {
                session: next,
                reply: Reply::Dates { message, dates },
            },
            Outcome::Reply(message) => {
                next.transcript.push_assistant(&message);
                Turn { session: next, reply: Reply::text(message) }
            }
        };

        tracing::debug!(
            from = %step,
            to = %turn.session.step,
            transcript = turn.session.transcript.len(),
            "Turn complete"
        );
        Ok(turn)
    }

    async fn with_market_timeout<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.config.market_timeout, call)
            .await
            .map_err(|_| HedgeError::Timeout(self.config.market_timeout.as_secs()))?
    }

    /// Ask the advisor, folding any failure into the returned text
    async fn advise(&self, prompt: &str, session: &HedgeSession) -> String {
        match self.advisor.ask(prompt, &session.transcript).await {
            Ok(advice) => advice,
            Err(e) => {
                tracing::warn!(step = %session.step, error = %e, "Advisory call failed");
                prompts::advisory_error(&e)
            }
        }
    }

    // Step 1
    async fn on_symbol(&self, s: &mut HedgeSession, input: &str) -> Result<Outcome> {
        let symbol = match validation::parse_symbol(input) {
            Ok(symbol) => symbol,
            Err(e) => return Ok(Outcome::Rejected(e)),
        };

        let price = match self.with_market_timeout(self.market.get_current_price(&symbol)).await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "Price lookup failed");
                return Ok(Outcome::Rejected(ValidationError::InvalidSymbol));
            }
        };

        let reply = prompts::ask_shares(&symbol, price);
        s.symbol = Some(symbol);
        s.current_price = Some(price);
        s.step = Step::Shares;
        Ok(Outcome::Reply(reply))
    }

    // Step 2
    fn on_shares(s: &mut HedgeSession, input: &str) -> Result<Outcome> {
        let shares = match validation::parse_shares(input) {
            Ok(shares) => shares,
            Err(e) => return Ok(Outcome::Rejected(e)),
        };

        let reply = prompts::ask_loss_tolerance(s.symbol()?, shares);
        s.num_shares = Some(shares);
        s.step = Step::LossTolerance;
        Ok(Outcome::Reply(reply))
    }

    // Step 3
    fn on_loss_tolerance(s: &mut HedgeSession, input: &str) -> Outcome {
        match validation::parse_amount(input) {
            Ok(amount) => {
                s.loss_aversion = Some(amount);
                s.step = Step::Duration;
                Outcome::Reply(prompts::ask_duration(amount))
            }
            Err(e) => Outcome::Rejected(e),
        }
    }

    // Step 4
    async fn on_duration(
        &self,
        s: &mut HedgeSession,
        input: &str,
        today: NaiveDate,
    ) -> Result<Outcome> {
        let weeks = match validation::parse_weeks(input) {
            Ok(weeks) => weeks,
            Err(e) => return Ok(Outcome::Rejected(e)),
        };
        let Some(target) = today.checked_add_signed(chrono::Duration::weeks(i64::from(weeks))) else {
            return Ok(Outcome::Rejected(ValidationError::InvalidWeeks));
        };

        let symbol = s.symbol()?.to_string();
        let window = self.config.expiration_window_weeks;
        let lookup = async {
            Ok::<_, HedgeError>(self.market.get_expiration_dates(&symbol, target, window).await)
        };
        let dates = self.with_market_timeout(lookup).await.unwrap_or_else(|e| {
            tracing::warn!(symbol = %symbol, error = %e, "Expiration lookup failed");
            Vec::new()
        });

        let message = prompts::offer_expirations(target, window, !dates.is_empty());
        let listed = dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();

        s.hedge_duration_weeks = Some(weeks);
        s.expiration_dates = dates;
        s.step = Step::Expiration;
        Ok(Outcome::Dates { message, dates: listed })
    }

    // Step 5
    fn on_expiration(s: &mut HedgeSession, input: &str) -> Result<Outcome> {
        let expiration = input.to_string();
        let reply = prompts::ask_reason(expiration.trim(), s.symbol()?);
        s.expiration_date = Some(expiration);
        s.step = Step::Reason;
        Ok(Outcome::Reply(reply))
    }

    // Step 6
    async fn on_reason(&self, s: &mut HedgeSession, input: &str) -> Result<Outcome> {
        let sentiment = Sentiment::from_reason(input);
        let prompt = prompts::strike_suggestion_prompt(
            s.symbol()?,
            s.current_price()?,
            input,
            sentiment,
            s.expiration_date()?,
        );

        let suggestion = self.advise(&prompt, s).await;

        s.hedging_reason = Some(input.to_string());
        s.sentiment = Some(sentiment);
        s.suggested_strike_price = Some(suggestion.clone());
        s.step = Step::Strike;
        Ok(Outcome::Reply(prompts::ask_strike(&suggestion)))
    }

    // Step 7
    async fn on_strike(&self, s: &mut HedgeSession, input: &str) -> Result<Outcome> {
        let strike: Decimal = match validation::parse_strike(input) {
            Ok(strike) => strike,
            Err(e) => return Ok(Outcome::Rejected(e)),
        };

        let option_type = OptionType::from(s.sentiment()?);
        let symbol = s.symbol()?.to_string();
        let expiration = s.expiration_date()?.to_string();
        let shares = s.num_shares()?;

        let premiums = match self
            .with_market_timeout(self.market.get_premiums(&symbol, &expiration, strike))
            .await
        {
            Ok(premiums) => premiums,
            Err(e) => {
                tracing::warn!(symbol = %symbol, expiration = %expiration, error = %e, "Premium lookup failed");
                return Ok(Outcome::Rejected(ValidationError::PremiumsUnavailable));
            }
        };
        let total_cost = premiums.total_cost(shares);

        let prompt = prompts::sizing_prompt(
            &symbol,
            shares,
            strike,
            &expiration,
            option_type,
            &premiums,
            total_cost,
        );
        let advice = self.advise(&prompt, s).await;

        s.strike_price = Some(strike);
        s.option_type = Some(option_type);
        s.premiums = premiums;
        s.total_cost = Some(total_cost);
        s.step = Step::Decision;
        Ok(Outcome::Reply(prompts::hedge_summary(
            option_type,
            strike,
            &premiums,
            total_cost,
            &advice,
        )))
    }

    // Step 8
    fn on_decision(s: &mut HedgeSession, input: &str) -> Outcome {
        match Decision::parse(input) {
            Decision::Yes => Outcome::Reply(prompts::broker_list()),
            Decision::No | Decision::Other => {
                s.step = Step::Question;
                Outcome::Reply(prompts::EXPLAIN_CONCERNS.to_string())
            }
        }
    }

    // Step 9
    async fn on_question(&self, s: &mut HedgeSession, input: &str) -> Outcome {
        let answer = self.advise(&prompts::question_prompt(input), s).await;
        s.step = Step::Decision;
        Outcome::Reply(prompts::answer_and_reask(&answer))
    }
}
