//! Forecast Service
//!
//! HTTP backend for Vedic forecast previews. Exposes forecast generation and
//! dasha-period selection, both behind rate limiting and a CAPTCHA admission
//! gate; text generation is delegated to an external LLM provider.

pub mod captcha;
pub mod chart_client;
pub mod config;
pub mod handlers;
pub mod llm;
pub mod models;
pub mod prompts;
pub mod rate_limit;
pub mod style;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use captcha::CaptchaVerifier;
pub use chart_client::ChartClient;
pub use config::Config;
pub use handlers::AppState;
pub use llm::LlmClient;
pub use rate_limit::{RateLimitConfig, RateLimiter};

impl AppState {
    /// Build the state and provider clients from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let captcha = CaptchaVerifier::new(
            config.captcha_secret_key.clone(),
            config.captcha_verify_url.clone(),
        )?;

        let llm = match &config.openai_api_key {
            Some(key) => Some(LlmClient::new(
                config.openai_base_url.clone(),
                key.clone(),
                config.openai_model.clone(),
            )?),
            None => None,
        };

        let chart = match &config.chart_service_url {
            Some(url) => Some(ChartClient::new(url.clone())?),
            None => None,
        };

        Ok(Self {
            captcha,
            llm,
            chart,
            limiter: RateLimiter::new(RateLimitConfig::default()),
        })
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/api/forecast", post(handlers::generate_forecast_handler))
        .route("/api/dasha", post(handlers::current_dasha_handler))
        .with_state(shared_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
