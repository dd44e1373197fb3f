//! Forecast Service
//!
//! REST API for captcha-gated Vedic forecast generation

use anyhow::{Context, Result};
use forecast_service::{create_router, AppState, Config};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forecast_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration (.env honored inside from_env)
    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Starting Forecast Service");
    if config.captcha_secret_key.is_none() {
        warn!("CAPTCHA_SECRET_KEY not set - captcha verification disabled");
    }
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY not set - forecast requests will fail");
    }

    let state = AppState::from_config(&config).context("Failed to initialize providers")?;

    let app = create_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    info!("Forecast Service running on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
