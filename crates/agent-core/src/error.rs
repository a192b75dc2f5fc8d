//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider did not answer within the configured limit
    #[error("Provider timed out after {0}s")]
    Timeout(u64),

    /// Provider answered with no usable text
    #[error("Provider returned an empty completion")]
    EmptyCompletion,

    /// Session store error
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::RateLimited(_) | Self::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(AgentError::Timeout(30).is_retryable());
        assert!(AgentError::RateLimited("slow down".into()).is_retryable());
        assert!(!AgentError::Auth("bad key".into()).is_retryable());
    }

    #[test]
    fn test_display_keeps_detail() {
        let err = AgentError::Session("lock poisoned".into());
        assert_eq!(err.to_string(), "Session error: lock poisoned");

        let err: AgentError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, AgentError::Json(_)));
    }
}
