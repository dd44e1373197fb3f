//! LLM provider client
//!
//! Calls an OpenAI-style chat completions endpoint with a single forced
//! `save_forecast` function tool so the model must return the five forecast
//! sections as structured arguments. Payloads are never logged, only metadata.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use jyotish_common::ForecastSections;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

const MAX_TOKENS: u32 = 600;
const TEMPERATURE: f64 = 0.65;
const PRESENCE_PENALTY: f64 = 0.3;
const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the forecast-generation provider
pub struct LlmClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

/// Completed generation plus provider-reported token usage
#[derive(Debug)]
pub struct Generation {
    pub sections: ForecastSections,
    pub usage: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: ToolCallFunction,
}

#[derive(Debug, Deserialize)]
struct ToolCallFunction {
    arguments: String,
}

impl LlmClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(GENERATION_TIMEOUT)
            .build()
            .context("Failed to build LLM HTTP client")?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        })
    }

    /// Schema for the forced tool call; all five sections are required
    fn forecast_tool() -> serde_json::Value {
        json!({
            "type": "function",
            "function": {
                "name": "save_forecast",
                "description": "Save the forecast sections for the reader",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "who_you_are_right_now": { "type": "string" },
                        "whats_happening_in_your_life": { "type": "string" },
                        "pivotal_life_theme": { "type": "string" },
                        "what_is_becoming_tighter_or_less_forgiving": { "type": "string" },
                        "upgrade_hook": { "type": "string" }
                    },
                    "required": [
                        "who_you_are_right_now",
                        "whats_happening_in_your_life",
                        "pivotal_life_theme",
                        "what_is_becoming_tighter_or_less_forgiving",
                        "upgrade_hook"
                    ]
                }
            }
        })
    }

    /// Generate forecast sections from the assembled prompts
    pub async fn generate_forecast(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<Generation> {
        let payload = json!({
            "model": self.model,
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
            "presence_penalty": PRESENCE_PENALTY,
            "frequency_penalty": 0.0,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
            "tools": [Self::forecast_tool()],
            "tool_choice": { "type": "function", "function": { "name": "save_forecast" } },
        });

        info!(
            "LLM request: model={} max_tokens={}",
            self.model, MAX_TOKENS
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("LLM request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("LLM provider returned {}: {}", status, body);
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to parse LLM response")?;

        let arguments = chat
            .choices
            .first()
            .and_then(|c| c.message.tool_calls.first())
            .map(|t| t.function.arguments.as_str())
            .context("Missing tool output")?;

        let sections: ForecastSections =
            serde_json::from_str(arguments).context("Failed to parse tool JSON")?;

        if !sections.is_usable() {
            bail!("Empty forecast output");
        }

        Ok(Generation {
            sections,
            usage: chat.usage,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool_call_body(arguments: &str) -> String {
        json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "function": { "name": "save_forecast", "arguments": arguments }
                    }]
                }
            }],
            "usage": { "prompt_tokens": 250, "completion_tokens": 400 }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_generate_forecast_parses_tool_output() {
        let mock_server = MockServer::start().await;

        let arguments = json!({
            "who_you_are_right_now": "Holding two directions at once.",
            "whats_happening_in_your_life": "Pressure is concentrating.",
            "pivotal_life_theme": "Career.",
            "what_is_becoming_tighter_or_less_forgiving": "Delay.",
            "upgrade_hook": "The full brief shows where this peaks."
        })
        .to_string();

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(tool_call_body(&arguments)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = LlmClient::new(mock_server.uri(), "test-key", "gpt-4.1-mini").unwrap();
        let generation = client.generate_forecast("system", "user").await.unwrap();

        assert!(generation.sections.is_usable());
        assert!(generation.usage.is_some());
        assert_eq!(
            generation.sections.pivotal_life_theme.as_deref(),
            Some("Career.")
        );
    }

    #[tokio::test]
    async fn test_generate_forecast_provider_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&mock_server)
            .await;

        let client = LlmClient::new(mock_server.uri(), "test-key", "gpt-4.1-mini").unwrap();
        let err = client.generate_forecast("system", "user").await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_generate_forecast_missing_tool_call() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                json!({ "choices": [{ "message": {} }] }).to_string(),
            ))
            .mount(&mock_server)
            .await;

        let client = LlmClient::new(mock_server.uri(), "test-key", "gpt-4.1-mini").unwrap();
        let err = client.generate_forecast("system", "user").await.unwrap_err();
        assert!(err.to_string().contains("Missing tool output"));
    }

    #[tokio::test]
    async fn test_generate_forecast_empty_first_section() {
        let mock_server = MockServer::start().await;

        let arguments = json!({ "who_you_are_right_now": "" }).to_string();
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(tool_call_body(&arguments)))
            .mount(&mock_server)
            .await;

        let client = LlmClient::new(mock_server.uri(), "test-key", "gpt-4.1-mini").unwrap();
        let err = client.generate_forecast("system", "user").await.unwrap_err();
        assert!(err.to_string().contains("Empty forecast output"));
    }
}
