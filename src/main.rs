//! Groundwater HMPI server entry point.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use groundwater_hmpi::{build_router, config::Config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "groundwater_hmpi=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    if config.summary.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; analyses will fail at the summary step");
    }
    tracing::info!(
        model = %config.summary.model,
        timeout_secs = config.summary.timeout.as_secs(),
        "Summary service configured"
    );

    let state = AppState::new(&config.summary)?;
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
