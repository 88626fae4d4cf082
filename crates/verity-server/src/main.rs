mod configuration;
mod error;
mod routes;
mod state;

use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;
use verity::{
    prompt::{CachedPrompt, ReloadingPrompt, DEFAULT_FACT_CHECK_PROMPT, DEFAULT_SYSTEM_PROMPT},
    providers::gemini::GeminiProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let settings = configuration::Settings::new()?;

    let provider = Arc::new(GeminiProvider::new(settings.provider.provider_config())?);
    let state = state::AppState::new(
        provider,
        settings.provider.model.clone(),
        Arc::new(ReloadingPrompt::new(
            &settings.prompts.system_path,
            DEFAULT_SYSTEM_PROMPT,
        )),
        Arc::new(CachedPrompt::new(
            &settings.prompts.fact_check_path,
            DEFAULT_FACT_CHECK_PROMPT,
        )),
    );

    // Create router with CORS support
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(settings.server.socket_addr()?).await?;
    info!(model = %settings.provider.model, "listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
