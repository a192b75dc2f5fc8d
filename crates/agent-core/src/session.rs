//! Session Management
//!
//! Keyed, per-client state storage with idle expiry. The store is generic
//! over the state it holds; callers own the meaning of that state.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AgentError, Result};

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session store trait for persistence
///
/// Implementations must give read-your-writes consistency per key.
pub trait SessionStore<S>: Send + Sync {
    /// Load a live session, `None` when absent or expired
    fn load(&self, id: &SessionId) -> Result<Option<S>>;

    /// Create or replace a session, refreshing its idle timer
    fn save(&self, id: &SessionId, state: S) -> Result<()>;

    /// Delete a session
    fn delete(&self, id: &SessionId) -> Result<()>;

    /// Drop every expired session, returning how many were removed
    fn purge_expired(&self) -> Result<usize>;
}

struct Entry<S> {
    state: S,
    touched_at: DateTime<Utc>,
}

/// In-memory session store with an idle timeout
pub struct MemorySessionStore<S> {
    sessions: RwLock<HashMap<SessionId, Entry<S>>>,
    idle_ttl: Duration,
}

impl<S> MemorySessionStore<S> {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Idle time after which a session is discarded
    pub const fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    /// Number of stored sessions, expired ones included until purged
    pub fn len(&self) -> usize {
        self.sessions.read().map_or(0, |s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &Entry<S>, now: DateTime<Utc>) -> bool {
        now - entry.touched_at >= self.idle_ttl
    }
}

impl<S> Default for MemorySessionStore<S> {
    fn default() -> Self {
        Self::new(Duration::minutes(30))
    }
}

fn poisoned<T>(_: T) -> AgentError {
    AgentError::Session("session store lock poisoned".into())
}

impl<S: Clone + Send + Sync> SessionStore<S> for MemorySessionStore<S> {
    fn load(&self, id: &SessionId) -> Result<Option<S>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        let now = Utc::now();
        Ok(sessions
            .get(id)
            .filter(|entry| !self.is_expired(entry, now))
            .map(|entry| entry.state.clone()))
    }

    fn save(&self, id: &SessionId, state: S) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.insert(id.clone(), Entry { state, touched_at: Utc::now() });
        Ok(())
    }

    fn delete(&self, id: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.remove(id);
        Ok(())
    }

    fn purge_expired(&self) -> Result<usize> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
        assert_eq!(SessionId::from_string("abc").as_str(), "abc");
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store: MemorySessionStore<u32> = MemorySessionStore::default();
        let id = SessionId::new();

        assert!(store.load(&id).unwrap().is_none());

        store.save(&id, 7).unwrap();
        assert_eq!(store.load(&id).unwrap(), Some(7));

        store.save(&id, 8).unwrap();
        assert_eq!(store.load(&id).unwrap(), Some(8));

        store.delete(&id).unwrap();
        assert!(store.load(&id).unwrap().is_none());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store: MemorySessionStore<&str> = MemorySessionStore::default();
        let a = SessionId::new();
        let b = SessionId::new();

        store.save(&a, "alpha").unwrap();
        store.save(&b, "beta").unwrap();
        store.delete(&a).unwrap();

        assert!(store.load(&a).unwrap().is_none());
        assert_eq!(store.load(&b).unwrap(), Some("beta"));
    }

    #[test]
    fn test_expired_sessions_are_invisible_and_purged() {
        let store: MemorySessionStore<u32> = MemorySessionStore::new(Duration::zero());
        let id = SessionId::new();

        store.save(&id, 1).unwrap();
        assert!(store.load(&id).unwrap().is_none());
        assert_eq!(store.len(), 1);

        assert_eq!(store.purge_expired().unwrap(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_purge_keeps_live_sessions() {
        let store: MemorySessionStore<u32> = MemorySessionStore::new(Duration::hours(1));
        store.save(&SessionId::new(), 1).unwrap();
        assert_eq!(store.purge_expired().unwrap(), 0);
        assert_eq!(store.len(), 1);
    }
}
