//! Router

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{health_check, next, reset, start};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))

        // Wizard API
        .route("/start", post(start))
        .route("/next", post(next))
        .route("/reset", post(reset))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
