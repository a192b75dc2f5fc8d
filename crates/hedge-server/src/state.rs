//! Application State

use std::sync::Arc;

use agent_core::SessionStore;
use hedge_advisor::{HedgeSession, HedgeWizard};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Conversation state machine with its market data and advisor
    pub wizard: Arc<HedgeWizard>,

    /// Per-client wizard sessions, keyed by cookie
    pub sessions: Arc<dyn SessionStore<HedgeSession>>,

    /// Name of the cookie carrying the session id
    pub cookie_name: Arc<str>,
}
