//! Birth chart provider client
//!
//! Enrichment source only: any failure degrades to an empty chart instead of
//! failing the request. Contrast with the captcha gate, which fails closed.

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, warn};

use jyotish_common::BirthChartData;

const CHART_TIMEOUT: Duration = Duration::from_secs(15);

/// Lahiri ayanamsa, the default for Vedic charts
const AYANAMSA: u8 = 1;

/// Client for the external birth-chart service
pub struct ChartClient {
    base_url: String,
    client: reqwest::Client,
}

impl ChartClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(CHART_TIMEOUT)
            .build()
            .context("Failed to build chart HTTP client")?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Fetch chart data for a birth moment. Never fails: provider errors are
    /// logged and an empty chart is returned.
    pub async fn fetch_birth_chart(
        &self,
        datetime_utc: &str,
        latitude: f64,
        longitude: f64,
    ) -> BirthChartData {
        debug!(
            "Fetching birth chart: datetime={} lat={} lon={}",
            datetime_utc, latitude, longitude
        );

        let payload = json!({
            "datetime": datetime_utc,
            "latitude": latitude,
            "longitude": longitude,
            "ayanamsa": AYANAMSA,
        });

        let result = async {
            let response = self
                .client
                .post(&self.base_url)
                .json(&payload)
                .send()
                .await?;

            if !response.status().is_success() {
                warn!("Chart provider returned {}", response.status());
                return Ok(BirthChartData::default());
            }

            response.json::<BirthChartData>().await
        }
        .await;

        match result {
            Ok(chart) => {
                if chart.is_empty() {
                    debug!("Chart provider returned no usable data");
                }
                chart
            }
            Err(e) => {
                warn!("Birth chart fetch failed: {}", e);
                BirthChartData::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_birth_chart_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "ayanamsa": 1 })))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"moonSign":"Karka","sunSign":"Simha","nakshatra":"Pushya"}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = ChartClient::new(mock_server.uri()).unwrap();
        let chart = client
            .fetch_birth_chart("2000-01-15T05:00:00Z", 28.61, 77.23)
            .await;

        assert_eq!(chart.moon_sign.as_deref(), Some("Karka"));
        assert_eq!(chart.nakshatra.as_deref(), Some("Pushya"));
    }

    #[tokio::test]
    async fn test_fetch_birth_chart_provider_error_degrades_to_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = ChartClient::new(mock_server.uri()).unwrap();
        let chart = client
            .fetch_birth_chart("2000-01-15T05:00:00Z", 28.61, 77.23)
            .await;

        assert!(chart.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_birth_chart_connection_error_degrades_to_empty() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ChartClient::new(format!("http://{}", addr)).unwrap();
        let chart = client
            .fetch_birth_chart("2000-01-15T05:00:00Z", 28.61, 77.23)
            .await;

        assert!(chart.is_empty());
    }
}
