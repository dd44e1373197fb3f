//! API request handlers for the forecast service
//!
//! Both POST endpoints run the same admission pipeline before any provider
//! work: body size cap, validation, rate limits, captcha escalation, captcha
//! verification. Every exit path logs one completion line.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Datelike;
use serde_json::json;
use tracing::{error, info};

use jyotish_common::{dasha, signs, BirthChartData};

use crate::captcha::CaptchaVerifier;
use crate::chart_client::ChartClient;
use crate::llm::LlmClient;
use crate::models::{DashaRequest, DashaResponse, ForecastRequest, ForecastResponse};
use crate::prompts::{build_system_prompt, build_user_prompt, PromptContext};
use crate::rate_limit::{is_suspicious_user_agent, RateLimiter};
use crate::style;

/// Largest accepted request body in bytes
pub const MAX_REQUEST_BODY_SIZE: usize = 5_000;

/// Shared application state
pub struct AppState {
    pub captcha: CaptchaVerifier,
    pub llm: Option<LlmClient>,
    pub chart: Option<ChartClient>,
    pub limiter: RateLimiter,
}

/// JSON error envelope with the given status
fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// First forwarded hop, then the reverse proxy header, else "unknown"
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

fn log_complete(endpoint: &str, outcome: &str, reason: &str, ip: &str, started: Instant) {
    info!(
        "Request complete: endpoint={} outcome={} reason={} ip={} latency_ms={}",
        endpoint,
        outcome,
        reason,
        ip,
        started.elapsed().as_millis()
    );
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "forecast-service"
    }))
}

/// Run the admission pipeline. `Err` carries the response that ends the
/// request early; `Ok` means the caller may proceed to provider work.
async fn admit(
    state: &AppState,
    endpoint: &str,
    ip: &str,
    ua: &str,
    device_id: Option<&str>,
    captcha_token: Option<&str>,
    started: Instant,
) -> Result<(), Response> {
    let is_traffic_spike = state.limiter.observe_traffic_spike();
    let is_suspicious = is_suspicious_user_agent(ua);

    let decision = state.limiter.check(ip, device_id);
    if !decision.allowed {
        log_complete(endpoint, "fail", "rate_limit", ip, started);
        let message = decision
            .message
            .unwrap_or_else(|| "Too many requests.".to_string());
        return Err(error_response(StatusCode::TOO_MANY_REQUESTS, &message));
    }

    let captcha_required = decision.require_captcha || is_suspicious || is_traffic_spike;

    if captcha_required && captcha_token.is_none() {
        info!(
            "Request complete: endpoint={} outcome=captcha_required \
             threshold={} suspicious={} spike={} ip={} latency_ms={}",
            endpoint,
            decision.require_captcha,
            is_suspicious,
            is_traffic_spike,
            ip,
            started.elapsed().as_millis()
        );
        return Err((
            StatusCode::OK,
            Json(json!({
                "captcha_required": true,
                "message": "Please complete the verification to continue."
            })),
        )
            .into_response());
    }

    if let Some(token) = captcha_token {
        if !state.captcha.verify(token, ip).await {
            info!(
                "Request complete: endpoint={} outcome=fail reason=captcha_verification_failed \
                 ip={} token_hash={} latency_ms={}",
                endpoint,
                ip,
                style::hash_token(token),
                started.elapsed().as_millis()
            );
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "CAPTCHA verification failed. Please try again.",
            ));
        }
    }

    Ok(())
}

/// Parse and validate a JSON request body, mapping failures to 400s
fn parse_body<T>(endpoint: &str, body: &str, ip: &str, started: Instant) -> Result<T, Response>
where
    T: serde::de::DeserializeOwned,
{
    if body.len() > MAX_REQUEST_BODY_SIZE {
        log_complete(endpoint, "fail", "request_too_large", ip, started);
        return Err(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "Request too large",
        ));
    }

    let value: serde_json::Value = serde_json::from_str(body).map_err(|_| {
        log_complete(endpoint, "fail", "invalid_json", ip, started);
        error_response(StatusCode::BAD_REQUEST, "Invalid JSON")
    })?;

    serde_json::from_value(value).map_err(|e| {
        log_complete(endpoint, "fail", "validation_error", ip, started);
        error_response(StatusCode::BAD_REQUEST, &format!("Invalid input: {}", e))
    })
}

/// Generate a forecast for a birth moment
pub async fn generate_forecast_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let started = Instant::now();
    let ip = client_ip(&headers);
    let ua = user_agent(&headers);

    info!("Forecast request started: ip={}", ip);

    let request: ForecastRequest = match parse_body("forecast", &body, &ip, started) {
        Ok(r) => r,
        Err(response) => return response,
    };

    if let Err(e) = request.validate() {
        log_complete("forecast", "fail", "validation_error", &ip, started);
        return error_response(StatusCode::BAD_REQUEST, &e.to_string());
    }

    if let Err(response) = admit(
        &state,
        "forecast",
        &ip,
        &ua,
        request.device_id.as_deref(),
        request.captcha_token.as_deref(),
        started,
    )
    .await
    {
        return response;
    }

    let Some(llm) = state.llm.as_ref() else {
        log_complete("forecast", "fail", "missing_llm_key", &ip, started);
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Service configuration error. Please try again later.",
        );
    };

    let target_year = chrono::Utc::now().year();
    let age = request
        .birth_time_utc
        .as_deref()
        .and_then(|utc| style::calculate_age(utc, target_year))
        .or_else(|| style::calculate_age(&request.birth_date, target_year))
        .unwrap_or(0);

    let seed_input = request.birth_time_utc.clone().unwrap_or_else(|| {
        format!(
            "{}+{}+{}",
            request.birth_date, request.birth_time, request.birth_place
        )
    });
    let seed = style::style_seed(&seed_input);
    let pivotal_life_element = style::pick_pivotal_life_element(age, &seed);

    let chart = match (
        state.chart.as_ref(),
        request.birth_time_utc.as_deref(),
        request.latitude,
        request.longitude,
    ) {
        (Some(client), Some(utc), Some(lat), Some(lon)) => {
            client.fetch_birth_chart(utc, lat, lon).await
        }
        _ => BirthChartData::default(),
    };

    let western_zodiac = chrono::NaiveDate::parse_from_str(&request.birth_date, "%Y-%m-%d")
        .ok()
        .map(|d| signs::western_zodiac_for(d.month(), d.day()).to_string());

    let user_prompt = build_user_prompt(&PromptContext {
        chart: &chart,
        pivotal_life_element,
    });

    match llm
        .generate_forecast(build_system_prompt(), &user_prompt)
        .await
    {
        Ok(generation) => {
            info!(
                "Request complete: endpoint=forecast outcome=success ip={} model={} \
                 tokens={} latency_ms={}",
                ip,
                llm.model(),
                generation
                    .usage
                    .as_ref()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| "null".to_string()),
                started.elapsed().as_millis()
            );

            let forecast = generation.sections.to_text();
            (
                StatusCode::OK,
                Json(ForecastResponse {
                    forecast,
                    forecast_sections: generation.sections,
                    pivotal_theme: pivotal_life_element.to_string(),
                    western_zodiac,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Forecast generation failed: {:#}", e);
            log_complete("forecast", "fail", "llm_error", &ip, started);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unable to generate forecast. Please try again.",
            )
        }
    }
}

/// Select the dasha period active on the target date
pub async fn current_dasha_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let started = Instant::now();
    let ip = client_ip(&headers);
    let ua = user_agent(&headers);

    let request: DashaRequest = match parse_body("dasha", &body, &ip, started) {
        Ok(r) => r,
        Err(response) => return response,
    };

    if let Err(e) = request.validate() {
        log_complete("dasha", "fail", "validation_error", &ip, started);
        return error_response(StatusCode::BAD_REQUEST, &e.to_string());
    }

    if let Err(response) = admit(
        &state,
        "dasha",
        &ip,
        &ua,
        request.device_id.as_deref(),
        request.captcha_token.as_deref(),
        started,
    )
    .await
    {
        return response;
    }

    // validate() vouched for the format already
    let target = request
        .target_date
        .as_deref()
        .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    match dasha::select_current(&request.dasha_periods, target) {
        Ok(current) => {
            log_complete("dasha", "success", "ok", &ip, started);
            (StatusCode::OK, Json(DashaResponse { current })).into_response()
        }
        Err(e) => {
            log_complete("dasha", "fail", "invalid_period", &ip, started);
            error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_ip(&headers), "10.0.0.2");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn test_user_agent_missing_header_is_empty() {
        assert_eq!(user_agent(&HeaderMap::new()), "");
    }
}
