mod chat;
mod config;
mod errors;
mod llm_client;
mod notifier;
mod persona;
mod routes;
mod state;
mod tools;
mod ui;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::{ChatEngine, ChatLimits};
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::notifier::{DisabledNotifier, Notifier, PushoverNotifier};
use crate::persona::Persona;
use crate::routes::build_router;
use crate::state::AppState;
use crate::tools::ToolRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting persona chat v{}", env!("CARGO_PKG_VERSION"));

    // Persona context is read once; a missing profile or summary stops startup
    let persona = Persona::load(
        config.persona_name.clone(),
        &config.profile_path,
        &config.summary_path,
    )
    .context("Failed to load persona context")?;

    // Initialize LLM client
    let llm = LlmClient::new(
        config.llm_api_key.clone(),
        &config.llm_base_url,
        config.llm_model.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    // Initialize notifier
    let notifier: Arc<dyn Notifier> = match config.pushover.clone() {
        Some(credentials) => Arc::new(PushoverNotifier::new(credentials)?),
        None => {
            warn!("PUSHOVER_TOKEN/PUSHOVER_USER not set, tool notifications are disabled");
            Arc::new(DisabledNotifier)
        }
    };

    let engine = ChatEngine::new(
        Arc::new(llm),
        ToolRegistry::new(notifier),
        persona,
        config.contact_email.clone(),
        ChatLimits {
            max_questions: config.max_questions,
            max_tool_iterations: config.max_tool_iterations,
        },
    );
    info!(
        "Chat engine ready for {} (max {} questions per session)",
        engine.persona().name,
        config.max_questions
    );

    // Build router
    let app = build_router(AppState::new(engine)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
