//! Reply Texts and Advisory Prompts

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::model::{OptionType, Premiums, Sentiment};

/// System preamble for every advisory call
pub const HEDGE_ADVISOR_PROMPT: &str = r#"You are a careful options-hedging assistant.

The user owns shares of a single stock and wants to limit losses on that position with listed options.
The conversation so far is included; use every detail the user has given (symbol, share count, loss
tolerance, duration, expiration, outlook).

- Be concise: a short paragraph or a few bullet points.
- Quote concrete numbers (strike, premium, contracts) when you recommend something.
- One option contract covers 100 shares.
- Mention the main risk of the hedge you describe.
- This is educational guidance, not personalised financial advice."#;

pub const WELCOME: &str =
    "Welcome! Let's start with the basics. What is the stock symbol of the stock you want to hedge?";

pub const BROKERS: &[&str] = &[
    "Interactive Brokers",
    "Charles Schwab",
    "Fidelity",
    "E*TRADE",
    "Robinhood",
];

pub fn ask_shares(symbol: &str, price: Decimal) -> String {
    format!(
        "Great! {symbol} is currently trading at ${:.2}. How many shares do you own?",
        price
    )
}

pub fn ask_loss_tolerance(symbol: &str, shares: u32) -> String {
    format!(
        "You own {shares} shares of {symbol}. How much money, in dollars, are you willing to lose on this position?"
    )
}

pub fn ask_duration(amount: Decimal) -> String {
    format!(
        "Understood, you can tolerate a loss of ${:.2}. For how many weeks do you want the hedge to last?",
        amount
    )
}

pub fn offer_expirations(target: NaiveDate, window_weeks: u32, found: bool) -> String {
    if found {
        format!(
            "Here are the option expiration dates within {window_weeks} weeks of {target}. Which one would you like to use?"
        )
    } else {
        format!(
            "No option expirations are listed within {window_weeks} weeks of {target}. Please enter the expiration date (YYYY-MM-DD) you would like to use."
        )
    }
}

pub fn ask_reason(expiration: &str, symbol: &str) -> String {
    format!(
        "You selected {expiration}. Why do you want to hedge your {symbol} position? Are you bullish or bearish on it?"
    )
}

pub fn strike_suggestion_prompt(
    symbol: &str,
    price: Decimal,
    reason: &str,
    sentiment: Sentiment,
    expiration: &str,
) -> String {
    let option_type = OptionType::from(sentiment);
    format!(
        "The user wants to hedge {symbol}, currently trading at ${:.2}. \
         Their reason for hedging: \"{reason}\". Their outlook is {sentiment}. \
         Suggest a strike price for a {option_type} option expiring {expiration}, \
         and briefly explain why that strike fits their outlook.",
        price
    )
}

pub fn ask_strike(suggestion: &str) -> String {
    format!("{suggestion}\n\nWhat strike price would you like to use?")
}

pub fn sizing_prompt(
    symbol: &str,
    shares: u32,
    strike: Decimal,
    expiration: &str,
    option_type: OptionType,
    premiums: &Premiums,
    total_cost: Decimal,
) -> String {
    format!(
        "The user holds {shares} shares of {symbol} and chose a {option_type} option with a strike of ${:.2} \
         expiring {expiration}. Call premium: {}. Put premium: {}. Estimated total premium cost: ${:.2}. \
         Explain how many contracts they should buy to hedge the position and what the hedge protects against.",
        strike,
        describe_premium(premiums.call),
        describe_premium(premiums.put),
        total_cost
    )
}

pub fn hedge_summary(
    option_type: OptionType,
    strike: Decimal,
    premiums: &Premiums,
    total_cost: Decimal,
    advice: &str,
) -> String {
    format!(
        "For a {option_type} at a ${:.2} strike: call premium {}, put premium {}. \
         Total premium cost: ${:.2}.\n\n{advice}\n\nWould you like to proceed with this hedge? (yes/no)",
        strike,
        describe_premium(premiums.call),
        describe_premium(premiums.put),
        total_cost
    )
}

pub fn broker_list() -> String {
    let brokers: Vec<String> = BROKERS.iter().map(|b| format!("- {b}")).collect();
    format!(
        "Great! You can place this hedge with any options-enabled brokerage account, for example:\n{}\n\nIs there anything else you would like to know about your hedge?",
        brokers.join("\n")
    )
}

pub const EXPLAIN_CONCERNS: &str =
    "No problem. Please explain your questions or concerns about the hedge and I'll do my best to answer them.";

pub fn question_prompt(question: &str) -> String {
    format!(
        "The user has a question about the hedge discussed above: \"{question}\". \
         Answer it clearly using the details of their position."
    )
}

pub fn answer_and_reask(answer: &str) -> String {
    format!("{answer}\n\nWould you like to proceed with the hedge? (yes/no)")
}

/// Reply text used in place of advice when the advisory call fails
pub fn advisory_error(error: &impl std::fmt::Display) -> String {
    format!("Error: {error}")
}

fn describe_premium(premium: Option<Decimal>) -> String {
    premium.map_or_else(|| "not available".to_string(), |p| format!("${p:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_strike_prompt_embeds_context() {
        let prompt = strike_suggestion_prompt(
            "AAPL",
            dec!(227.5),
            "worried about earnings",
            Sentiment::Bearish,
            "2026-11-13",
        );
        assert!(prompt.contains("AAPL"));
        assert!(prompt.contains("$227.50"));
        assert!(prompt.contains("worried about earnings"));
        assert!(prompt.contains("bearish"));
        assert!(prompt.contains("put option"));
    }

    #[test]
    fn test_summary_marks_missing_premium() {
        let premiums = Premiums { call: Some(dec!(2.5)), put: None };
        let text = hedge_summary(OptionType::Put, dec!(150), &premiums, dec!(25), "Buy one contract.");
        assert!(text.contains("call premium $2.50"));
        assert!(text.contains("put premium not available"));
        assert!(text.contains("$25.00"));
        assert!(text.ends_with("(yes/no)"));
    }

    #[test]
    fn test_broker_list_names_every_broker() {
        let text = broker_list();
        for broker in BROKERS {
            assert!(text.contains(broker));
        }
    }
}
