//! Configuration management for the forecast service
//!
//! Loaded once at startup. A missing captcha secret is a supported state
//! (verification disabled, requests admitted), not a startup error; a missing
//! LLM key only surfaces when a forecast is actually requested.

use anyhow::{Context, Result};
use std::env;

use crate::captcha::DEFAULT_VERIFY_URL;
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server host
    pub host: String,

    /// API server port
    pub port: u16,

    /// Challenge-verification secret; `None` disables verification
    pub captcha_secret_key: Option<String>,

    /// Challenge-verification endpoint
    pub captcha_verify_url: String,

    /// LLM provider key; `None` makes forecast requests fail with a 500
    pub openai_api_key: Option<String>,

    /// LLM provider base URL
    pub openai_base_url: String,

    /// Model used for forecast generation
    pub openai_model: String,

    /// Birth-chart provider endpoint; `None` disables chart enrichment
    pub chart_service_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("FORECAST_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            port: env::var("FORECAST_PORT")
                .unwrap_or_else(|_| "8084".to_string())
                .parse()
                .context("Invalid FORECAST_PORT")?,

            captcha_secret_key: env::var("CAPTCHA_SECRET_KEY").ok(),

            captcha_verify_url: env::var("CAPTCHA_VERIFY_URL")
                .unwrap_or_else(|_| DEFAULT_VERIFY_URL.to_string()),

            openai_api_key: env::var("OPENAI_API_KEY").ok(),

            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),

            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),

            chart_service_url: env::var("CHART_SERVICE_URL").ok(),
        };

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("FORECAST_PORT must be greater than 0");
        }

        Ok(())
    }

    /// Get the API server address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
