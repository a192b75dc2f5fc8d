//! # agent-core
//!
//! Core advisory logic with provider-agnostic LLM abstraction and session storage.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Advisor                               │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Preamble + │  │  Timeout    │  │   LlmProvider       │  │
//! │  │  Transcript │──│  Guard      │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Ollama, OpenAI-compatible
//! services, or any other provider without changing advisory logic.

pub mod provider;
pub mod advisor;
pub mod message;
pub mod error;
pub mod session;

pub use advisor::{Advisor, AdvisorBuilder, AdvisorConfig};
pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::LlmProvider;
pub use session::{MemorySessionStore, SessionId, SessionStore};
