//! Server Configuration
//!
//! Everything is read from the environment (and `.env`, loaded in `main`).

use std::str::FromStr;
use std::time::Duration;

use hedge_advisor::YahooConfig;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Which advisory backend to talk to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProviderKind {
    #[default]
    Ollama,
    OpenAi,
}

impl FromStr for ProviderKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            _ => Err(()),
        }
    }
}

/// Where quotes and option chains come from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarketSource {
    #[default]
    Yahoo,
    Mock,
}

impl FromStr for MarketSource {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "mock" => Ok(Self::Mock),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub llm_provider: ProviderKind,
    pub advisor_model: String,
    pub advisor_timeout: Duration,
    pub market_data: MarketSource,
    pub market_timeout: Duration,
    /// Overrides the Yahoo Finance API root
    pub yahoo_url: Option<String>,
    pub session_ttl: chrono::Duration,
    pub session_cookie: String,
    pub expiration_window_weeks: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            llm_provider: ProviderKind::default(),
            advisor_model: "llama3.2".into(),
            advisor_timeout: Duration::from_secs(60),
            market_data: MarketSource::default(),
            market_timeout: Duration::from_secs(20),
            yahoo_url: None,
            session_ttl: chrono::Duration::minutes(30),
            session_cookie: "hedge_session".into(),
            expiration_window_weeks: 2,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; unset variables keep their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let parse = |var: &'static str| -> Result<Option<u64>, ConfigError> {
            lookup(var)
                .map(|value| {
                    value.trim().parse().map_err(|_| ConfigError::Invalid { var, value })
                })
                .transpose()
        };
        let choice = |var: &'static str| lookup(var).map(|value| (var, value));

        let llm_provider = match choice("LLM_PROVIDER") {
            Some((var, value)) => value.parse().map_err(|()| ConfigError::Invalid { var, value })?,
            None => defaults.llm_provider,
        };
        let market_data = match choice("MARKET_DATA") {
            Some((var, value)) => value.parse().map_err(|()| ConfigError::Invalid { var, value })?,
            None => defaults.market_data,
        };

        let session_ttl = match parse("SESSION_TTL_MINUTES")? {
            Some(minutes) => i64::try_from(minutes)
                .ok()
                .and_then(chrono::Duration::try_minutes)
                .ok_or_else(|| ConfigError::Invalid {
                    var: "SESSION_TTL_MINUTES",
                    value: minutes.to_string(),
                })?,
            None => defaults.session_ttl,
        };

        let expiration_window_weeks = match parse("EXPIRATION_WINDOW_WEEKS")? {
            Some(weeks) => u32::try_from(weeks).map_err(|_| ConfigError::Invalid {
                var: "EXPIRATION_WINDOW_WEEKS",
                value: weeks.to_string(),
            })?,
            None => defaults.expiration_window_weeks,
        };

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            llm_provider,
            advisor_model: lookup("ADVISOR_MODEL").unwrap_or(defaults.advisor_model),
            advisor_timeout: parse("ADVISOR_TIMEOUT_SECS")?
                .map_or(defaults.advisor_timeout, Duration::from_secs),
            market_data,
            market_timeout: parse("MARKET_DATA_TIMEOUT_SECS")?
                .map_or(defaults.market_timeout, Duration::from_secs),
            yahoo_url: lookup("YAHOO_FINANCE_URL"),
            session_ttl,
            session_cookie: lookup("SESSION_COOKIE").unwrap_or(defaults.session_cookie),
            expiration_window_weeks,
        })
    }

    /// Market data client settings, sharing the wizard's timeout
    pub fn yahoo_config(&self) -> YahooConfig {
        let defaults = YahooConfig::default();
        YahooConfig {
            base_url: self.yahoo_url.clone().unwrap_or(defaults.base_url),
            timeout: self.market_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.llm_provider, ProviderKind::Ollama);
        assert_eq!(config.market_data, MarketSource::Yahoo);
        assert_eq!(config.session_ttl, chrono::Duration::minutes(30));
        assert_eq!(config.session_cookie, "hedge_session");
        assert_eq!(config.expiration_window_weeks, 2);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("LLM_PROVIDER", "OpenAI"),
            ("MARKET_DATA", "mock"),
            ("ADVISOR_TIMEOUT_SECS", "5"),
            ("SESSION_TTL_MINUTES", "90"),
            ("MARKET_DATA_TIMEOUT_SECS", "7"),
            ("YAHOO_FINANCE_URL", "http://localhost:9000"),
        ])
        .unwrap();
        assert_eq!(config.llm_provider, ProviderKind::OpenAi);
        assert_eq!(config.market_data, MarketSource::Mock);
        assert_eq!(config.advisor_timeout, Duration::from_secs(5));
        assert_eq!(config.session_ttl, chrono::Duration::minutes(90));
        assert_eq!(config.market_timeout, Duration::from_secs(7));
        assert_eq!(config.yahoo_url.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn test_yahoo_config_follows_server_config() {
        let config = config_from(&[("MARKET_DATA_TIMEOUT_SECS", "3")]).unwrap();
        let yahoo = config.yahoo_config();
        assert_eq!(yahoo.timeout, Duration::from_secs(3));
        assert_eq!(yahoo.base_url, YahooConfig::default().base_url);

        let config = config_from(&[("YAHOO_FINANCE_URL", "http://quotes.internal")]).unwrap();
        assert_eq!(config.yahoo_config().base_url, "http://quotes.internal");
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = config_from(&[("MARKET_DATA", "bloomberg")]).unwrap_err();
        assert!(err.to_string().contains("MARKET_DATA"));

        assert!(config_from(&[("SESSION_TTL_MINUTES", "soon")]).is_err());
    }
}
