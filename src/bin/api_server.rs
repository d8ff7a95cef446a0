// API Server Binary Entry Point
//
// Purpose: Start the Legally axum server (BNS dataset + Groq)
// Usage: GROQ_API_KEY=... cargo run --bin api_server

use anyhow::Context;
use legally_api::{bind_listener, create_router, AppConfig, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "legally_api=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Legally API server...");

    let config = AppConfig::from_env();
    tracing::info!("Configuration:");
    tracing::info!("  BNS_DATA_PATH: {}", config.data_path.display());
    tracing::info!("  INDEX_HTML_PATH: {}", config.index_html_path.display());
    tracing::info!("  GROQ_MODEL: {}", config.llm.model);
    tracing::info!("  LLM_TIMEOUT: {:?}", config.llm.timeout);

    // Dataset load failure is fatal: never serve without the full store
    let state = AppState::new(&config).context("Failed to initialize application state")?;
    tracing::info!("Application state initialized ({} sections)", state.store.len());

    let app = create_router(state);

    let listener = bind_listener(&config)
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
