//! hedge-wizard HTTP Server
//!
//! Axum-based server exposing the hedge wizard as a cookie-scoped
//! conversation: `POST /start`, `POST /next`, `POST /reset`.

mod config;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{AdvisorBuilder, LlmProvider, MemorySessionStore, SessionStore};
use agent_runtime::{OllamaProvider, OpenAiProvider};
use hedge_advisor::{
    HedgeSession, HedgeWizard, MarketDataClient, MockMarketData, WizardConfig,
    YahooFinanceClient, HEDGE_ADVISOR_PROMPT,
};

use crate::config::{MarketSource, ProviderKind, ServerConfig};
use crate::state::AppState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Initialize LLM provider
    let provider: Arc<dyn LlmProvider> = match config.llm_provider {
        ProviderKind::Ollama => Arc::new(OllamaProvider::from_env()),
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::from_env()?),
    };

    match provider.health_check().await {
        Ok(true) => {
            let info = provider.info().await.ok();
            let name = info.as_ref().map_or("provider", |i| i.name.as_str());
            tracing::info!("✓ Connected to {}", name);
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Advisory provider not available - suggestions will show errors");
            tracing::warn!("  For Ollama, make sure it is running: ollama serve");
        }
    }

    let advisor = AdvisorBuilder::new()
        .provider(provider)
        .system_prompt(HEDGE_ADVISOR_PROMPT)
        .model(config.advisor_model.clone())
        .timeout(config.advisor_timeout)
        .build()?;

    // Initialize market data
    let market: Arc<dyn MarketDataClient> = match config.market_data {
        MarketSource::Yahoo => Arc::new(YahooFinanceClient::new(config.yahoo_config())?),
        MarketSource::Mock => {
            tracing::warn!("⚠ Using mock market data");
            Arc::new(MockMarketData::demo(Utc::now().date_naive()))
        }
    };

    let wizard = HedgeWizard::new(
        market,
        advisor,
        WizardConfig {
            expiration_window_weeks: config.expiration_window_weeks,
            market_timeout: config.market_timeout,
        },
    );

    // Session storage
    let sessions: Arc<dyn SessionStore<HedgeSession>> =
        Arc::new(MemorySessionStore::<HedgeSession>::new(config.session_ttl));
    spawn_session_sweeper(sessions.clone());

    // Build application state
    let state = AppState {
        wizard: Arc::new(wizard),
        sessions,
        cookie_name: Arc::from(config.session_cookie.as_str()),
    };

    let app = routes::app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 hedge-wizard server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Model: {} ({:?})", config.advisor_model, config.llm_provider);
    tracing::info!("Market data: {:?}", config.market_data);
    tracing::info!("Session idle timeout: {} min", config.session_ttl.num_minutes());
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health - Health check");
    tracing::info!("  POST /start  - Begin a hedge conversation");
    tracing::info!("  POST /next   - Answer the current question");
    tracing::info!("  POST /reset  - Discard the conversation");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Purge idle sessions once a minute
fn spawn_session_sweeper(sessions: Arc<dyn SessionStore<HedgeSession>>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            match sessions.purge_expired() {
                Ok(0) => {}
                Ok(purged) => tracing::debug!(purged, "Expired sessions purged"),
                Err(e) => tracing::warn!("Session sweep failed: {}", e),
            }
        }
    });
}
