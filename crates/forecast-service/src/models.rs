//! Request and response types with input validation

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use jyotish_common::{CurrentDasha, Error, ForecastSections, MahaPeriod, Result};

const MAX_BIRTH_PLACE_LENGTH: usize = 200;
const MAX_BIRTH_TIME_UTC_LENGTH: usize = 50;
const MAX_CAPTCHA_TOKEN_LENGTH: usize = 2000;

/// Forecast generation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequest {
    pub birth_date: String,
    pub birth_time: String,
    pub birth_place: String,
    pub birth_time_utc: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub device_id: Option<String>,
    pub captcha_token: Option<String>,
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidInput(message.into())
}

impl ForecastRequest {
    /// Validate field shapes; the first failure wins
    pub fn validate(&self) -> Result<()> {
        if chrono::NaiveDate::parse_from_str(&self.birth_date, "%Y-%m-%d").is_err()
            || self.birth_date.len() != 10
        {
            return Err(invalid("Invalid date format. Use YYYY-MM-DD"));
        }

        if chrono::NaiveTime::parse_from_str(&self.birth_time, "%H:%M").is_err()
            || self.birth_time.len() != 5
        {
            return Err(invalid("Invalid time format. Use HH:MM"));
        }

        if self.birth_place.len() < 2 {
            return Err(invalid("Birth place too short"));
        }
        if self.birth_place.len() > MAX_BIRTH_PLACE_LENGTH {
            return Err(invalid(format!(
                "Birth place too long (max {} chars)",
                MAX_BIRTH_PLACE_LENGTH
            )));
        }

        if let Some(utc) = &self.birth_time_utc {
            if utc.len() > MAX_BIRTH_TIME_UTC_LENGTH {
                return Err(invalid("Birth time UTC too long"));
            }
        }

        if let Some(device_id) = &self.device_id {
            if Uuid::parse_str(device_id).is_err() {
                return Err(invalid("Invalid device ID"));
            }
        }

        if let Some(token) = &self.captcha_token {
            if token.len() > MAX_CAPTCHA_TOKEN_LENGTH {
                return Err(invalid("Captcha token too long"));
            }
        }

        Ok(())
    }
}

/// Successful forecast response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResponse {
    pub forecast: String,
    pub forecast_sections: ForecastSections,
    pub pivotal_theme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub western_zodiac: Option<String>,
}

/// Dasha period selection request. Periods come from the chart provider;
/// the service only picks the one containing the target date.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashaRequest {
    pub dasha_periods: Vec<MahaPeriod>,
    pub target_date: Option<String>,
    pub device_id: Option<String>,
    pub captcha_token: Option<String>,
}

impl DashaRequest {
    pub fn validate(&self) -> Result<()> {
        if let Some(date) = &self.target_date {
            if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                return Err(invalid("Invalid target date. Use YYYY-MM-DD"));
            }
        }

        if let Some(device_id) = &self.device_id {
            if Uuid::parse_str(device_id).is_err() {
                return Err(invalid("Invalid device ID"));
            }
        }

        if let Some(token) = &self.captcha_token {
            if token.len() > MAX_CAPTCHA_TOKEN_LENGTH {
                return Err(invalid("Captcha token too long"));
            }
        }

        Ok(())
    }
}

/// Dasha selection response; `current` is null outside all known periods
#[derive(Debug, Serialize)]
pub struct DashaResponse {
    pub current: Option<CurrentDasha>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> ForecastRequest {
        ForecastRequest {
            birth_date: "1990-06-15".to_string(),
            birth_time: "04:30".to_string(),
            birth_place: "Jaipur, India".to_string(),
            birth_time_utc: Some("1990-06-14T23:00:00Z".to_string()),
            latitude: Some(26.9),
            longitude: Some(75.8),
            device_id: Some("4fd6ecdc-31f4-4a98-9f40-1a1f0a1b1de2".to_string()),
            captcha_token: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_minimal_request_passes() {
        let request = ForecastRequest {
            birth_time_utc: None,
            latitude: None,
            longitude: None,
            device_id: None,
            captcha_token: None,
            ..valid_request()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_bad_birth_date_rejected() {
        for bad in ["15-06-1990", "1990/06/15", "1990-6-5", "not a date", ""] {
            let request = ForecastRequest {
                birth_date: bad.to_string(),
                ..valid_request()
            };
            let err = request.validate().unwrap_err().to_string();
            assert!(err.contains("YYYY-MM-DD"), "{:?} gave {:?}", bad, err);
        }
    }

    #[test]
    fn test_bad_birth_time_rejected() {
        for bad in ["4:30", "04:30:00", "25:00", "xx:yy"] {
            let request = ForecastRequest {
                birth_time: bad.to_string(),
                ..valid_request()
            };
            assert!(request.validate().is_err(), "{:?} should fail", bad);
        }
    }

    #[test]
    fn test_birth_place_length_bounds() {
        let short = ForecastRequest {
            birth_place: "X".to_string(),
            ..valid_request()
        };
        assert!(short
            .validate()
            .unwrap_err()
            .to_string()
            .contains("Birth place too short"));

        let long = ForecastRequest {
            birth_place: "x".repeat(MAX_BIRTH_PLACE_LENGTH + 1),
            ..valid_request()
        };
        assert!(long.validate().unwrap_err().to_string().contains("too long"));
    }

    #[test]
    fn test_invalid_device_id_rejected() {
        let request = ForecastRequest {
            device_id: Some("not-a-uuid".to_string()),
            ..valid_request()
        };
        assert!(request
            .validate()
            .unwrap_err()
            .to_string()
            .contains("Invalid device ID"));
    }

    #[test]
    fn test_oversized_captcha_token_rejected() {
        let request = ForecastRequest {
            captcha_token: Some("t".repeat(MAX_CAPTCHA_TOKEN_LENGTH + 1)),
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_wire_format_is_camel_case() {
        let json = r#"{
            "birthDate": "1990-06-15",
            "birthTime": "04:30",
            "birthPlace": "Jaipur, India",
            "deviceId": "4fd6ecdc-31f4-4a98-9f40-1a1f0a1b1de2"
        }"#;
        let request: ForecastRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.birth_date, "1990-06-15");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_dasha_request_validation() {
        let request = DashaRequest {
            dasha_periods: vec![],
            target_date: Some("2026-01-01".to_string()),
            device_id: None,
            captcha_token: None,
        };
        assert!(request.validate().is_ok());

        let bad = DashaRequest {
            target_date: Some("01/01/2026".to_string()),
            ..request
        };
        assert!(bad.validate().is_err());
    }
}
