//! OpenAI-compatible Provider
//!
//! Talks to any `/chat/completions` endpoint (OpenAI, or a compatible gateway).

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::Message,
    provider::{
        Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo, ProviderInfo,
        TokenUsage,
    },
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// Bearer token
    pub api_key: String,

    /// API root, without the trailing `/chat/completions`
    pub base_url: String,

    /// HTTP request timeout
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Read `OPENAI_API_KEY` and optional `OPENAI_BASE_URL`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AgentError::Config("OPENAI_API_KEY is not set".into()))?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }
}

/// OpenAI-compatible chat completion provider
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiConfig::from_env()?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn translate_request(messages: &[Message], options: &GenerationOptions) -> ChatRequest {
        ChatRequest {
            model: options.model.clone(),
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.to_string(),
                    content: Some(m.content.clone()),
                })
                .collect(),
            max_tokens: Some(options.max_tokens),
            temperature: Some(options.temperature),
            top_p: Some(options.top_p),
            stream: false,
        }
    }

    fn normalize_response(resp: ChatResponse, model: &str) -> Result<Completion> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or(AgentError::EmptyCompletion)?;

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            model: model.to_string(),
            usage: resp.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason.as_deref().map(FinishReason::from_api),
        })
    }

    fn classify_status(status: reqwest::StatusCode, message: String) -> AgentError {
        match status.as_u16() {
            401 | 403 => AgentError::Auth(message),
            429 => AgentError::RateLimited(message),
            500..=599 => AgentError::ProviderUnavailable(format!("HTTP {status}: {message}")),
            _ => AgentError::Provider(format!("HTTP {status}: {message}")),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn info(&self) -> Result<ProviderInfo> {
        let models = self.list_models().await.unwrap_or_default();

        Ok(ProviderInfo {
            name: "OpenAI".into(),
            models,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("OpenAI health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = Self::translate_request(messages, options);

        let response = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    AgentError::ProviderUnavailable(e.to_string())
                } else {
                    AgentError::Provider(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::Provider(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map_or(body, |e| e.error.message);
            return Err(Self::classify_status(status, message));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        Self::normalize_response(parsed, &options.model)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(self.url("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::classify_status(status, "model listing failed".into()));
        }

        let list: ModelList = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(e.to_string()))?;

        Ok(list
            .data
            .into_iter()
            .map(|m| ModelInfo { name: m.id.clone(), id: m.id })
            .collect())
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_translation() {
        let messages = vec![Message::system("preamble"), Message::user("AAPL")];
        let options = GenerationOptions {
            model: "gpt-4o-mini".into(),
            ..Default::default()
        };

        let request = OpenAiProvider::translate_request(&messages, &options);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "AAPL");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_response_normalization() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Consider the $180 put."}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 40, "completion_tokens": 8, "total_tokens": 48}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        let completion = OpenAiProvider::normalize_response(parsed, "gpt-4o-mini").unwrap();

        assert_eq!(completion.content, "Consider the $180 put.");
        assert_eq!(completion.finish_reason, Some(FinishReason::Stop));
        assert_eq!(completion.usage.unwrap().total_tokens, 48);
    }

    #[test]
    fn test_no_choices_is_empty_completion() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        let err = OpenAiProvider::normalize_response(parsed, "m").unwrap_err();
        assert!(matches!(err, AgentError::EmptyCompletion));
    }

    #[test]
    fn test_status_classification() {
        let err = OpenAiProvider::classify_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "slow".into());
        assert!(err.is_retryable());
        let err = OpenAiProvider::classify_status(reqwest::StatusCode::UNAUTHORIZED, "key".into());
        assert!(matches!(err, AgentError::Auth(_)));
    }

    #[test]
    fn test_url_joining() {
        let mut config = OpenAiConfig::new("sk-test");
        config.base_url = "http://localhost:8080/v1/".into();
        let provider = OpenAiProvider::new(config).unwrap();
        assert_eq!(provider.url("models"), "http://localhost:8080/v1/models");
    }
}
