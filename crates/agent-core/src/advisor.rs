//! Advisory Calls
//!
//! A single-shot question to the model: fixed system preamble, the full
//! transcript in order, then the prompt. The first completion is returned
//! trimmed. Every call is bounded by a timeout, which surfaces as
//! [`AgentError::Timeout`] like any other upstream failure.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::provider::{GenerationOptions, LlmProvider};

/// Advisor configuration
#[derive(Clone, Debug)]
pub struct AdvisorConfig {
    /// System preamble sent ahead of every transcript
    pub system_prompt: String,

    /// Generation options
    pub generation: GenerationOptions,

    /// Upper bound on a single provider round-trip
    pub timeout: Duration,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            generation: GenerationOptions::default(),
            timeout: Duration::from_secs(60),
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. Be concise and accurate.";

/// Asks the configured provider for advice
#[derive(Clone)]
pub struct Advisor {
    provider: Arc<dyn LlmProvider>,
    config: AdvisorConfig,
}

impl Advisor {
    /// Create a new advisor
    pub fn new(provider: Arc<dyn LlmProvider>, config: AdvisorConfig) -> Self {
        Self { provider, config }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>) -> Self {
        Self::new(provider, AdvisorConfig::default())
    }

    /// Assemble the message list for a prompt
    fn build_messages(&self, prompt: &str, transcript: &Conversation) -> Vec<Message> {
        let mut messages = Vec::with_capacity(transcript.len() + 2);
        messages.push(Message::system(&self.config.system_prompt));
        messages.extend(transcript.messages().iter().cloned());
        messages.push(Message::user(prompt));
        messages
    }

    /// Ask the model a question with the transcript as context
    pub async fn ask(&self, prompt: &str, transcript: &Conversation) -> Result<String> {
        let messages = self.build_messages(prompt, transcript);

        tracing::debug!(
            model = %self.config.generation.model,
            context_messages = messages.len(),
            "Requesting advice"
        );

        let completion = tokio::time::timeout(
            self.config.timeout,
            self.provider.complete(&messages, &self.config.generation),
        )
        .await
        .map_err(|_| AgentError::Timeout(self.config.timeout.as_secs()))??;

        let content = completion.content.trim();
        if content.is_empty() {
            return Err(AgentError::EmptyCompletion);
        }

        Ok(content.to_string())
    }

    /// Check the underlying provider
    pub async fn health_check(&self) -> bool {
        self.provider.health_check().await.unwrap_or(false)
    }

    /// Get configuration
    pub const fn config(&self) -> &AdvisorConfig {
        &self.config
    }
}

/// Builder for Advisor configuration
pub struct AdvisorBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    config: AdvisorConfig,
}

impl Default for AdvisorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            config: AdvisorConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Advisor> {
        let provider = self.provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Advisor::new(provider, self.config))
    }
}
