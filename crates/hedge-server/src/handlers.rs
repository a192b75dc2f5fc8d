//! HTTP Handlers

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use agent_core::{AgentError, SessionId};
use hedge_advisor::{HedgeError, HedgeSession, Reply};

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub advisor_connected: bool,
    pub market_data: String,
}

#[derive(Debug, Deserialize)]
pub struct NextRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal_error(code: &str, error: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Internal server error: {error}"),
            code: code.into(),
        }),
    )
}

fn session_error(e: AgentError) -> ApiError {
    tracing::error!("Session store error: {}", e);
    internal_error("SESSION_ERROR", e)
}

fn wizard_error(e: HedgeError) -> ApiError {
    tracing::error!("Wizard error: {}", e);
    internal_error("WIZARD_ERROR", e)
}

// ============================================================================
// Cookies
// ============================================================================

/// Session id presented in the request's `Cookie` header
pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| SessionId::from_string(value))
}

fn set_cookie(name: &str, id: &SessionId) -> String {
    format!("{name}={id}; Path=/; HttpOnly; SameSite=Lax")
}

fn expire_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let advisor_connected = state.wizard.advisor().health_check().await;

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        advisor_connected,
        market_data: state.wizard.market().name().to_string(),
    })
}

/// Begin a new conversation, replacing any existing one for this client
pub async fn start(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let id = session_cookie(&headers, &state.cookie_name).unwrap_or_default();
    let turn = state.wizard.welcome();

    state.sessions.save(&id, turn.session).map_err(session_error)?;
    tracing::info!(session = %id, "Session started");

    Ok((
        [(header::SET_COOKIE, set_cookie(&state.cookie_name, &id))],
        Json(turn.reply),
    ))
}

/// Feed one user message to the wizard
pub async fn next(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NextRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id = session_cookie(&headers, &state.cookie_name).unwrap_or_default();

    let session = match state.sessions.load(&id).map_err(session_error)? {
        Some(session) => session,
        None => {
            tracing::info!(session = %id, "No live session, starting fresh");
            HedgeSession::new()
        }
    };
    let step = session.step;

    let turn = state
        .wizard
        .advance(session, &payload.message)
        .await
        .map_err(wizard_error)?;

    tracing::debug!(session = %id, from = %step, to = %turn.session.step, "Advanced");
    state.sessions.save(&id, turn.session).map_err(session_error)?;

    Ok((
        [(header::SET_COOKIE, set_cookie(&state.cookie_name, &id))],
        Json::<Reply>(turn.reply),
    ))
}

/// Forget this client's conversation
pub async fn reset(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(id) = session_cookie(&headers, &state.cookie_name) {
        state.sessions.delete(&id).map_err(session_error)?;
        tracing::info!(session = %id, "Session cleared");
    }

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, expire_cookie(&state.cookie_name))],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; hedge_session=abc-123; lang=en"),
        );

        let id = session_cookie(&headers, "hedge_session").unwrap();
        assert_eq!(id.as_str(), "abc-123");
        assert!(session_cookie(&headers, "other").is_none());
    }

    #[test]
    fn test_empty_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("hedge_session="));
        assert!(session_cookie(&headers, "hedge_session").is_none());
    }

    #[test]
    fn test_cookie_attributes() {
        let id = SessionId::from_string("abc");
        assert_eq!(
            set_cookie("hedge_session", &id),
            "hedge_session=abc; Path=/; HttpOnly; SameSite=Lax"
        );
        assert!(expire_cookie("hedge_session").ends_with("Max-Age=0"));
    }
}
