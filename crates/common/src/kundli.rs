//! Shared types for Kundli (birth chart) data

use serde::{Deserialize, Serialize};

/// Position of a single graha in the chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanetPosition {
    pub id: u32,
    pub name: String,
    pub sign: String,
    pub sign_id: u32,
    pub sign_lord: String,
    pub degree: f64,
    pub full_degree: f64,
    pub is_retrograde: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nakshatra: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nakshatra_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nakshatra_pada: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nakshatra_lord: Option<String>,
}

/// Full Kundli as assembled for a reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KundliData {
    pub nakshatra: String,
    pub nakshatra_id: u32,
    pub nakshatra_pada: u8,
    pub nakshatra_lord: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nakshatra_gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ganam: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal_sign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nadi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lucky_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syllables: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_stone: Option<String>,
    pub moon_sign: String,
    pub moon_sign_id: u32,
    pub moon_sign_lord: String,
    pub sun_sign: String,
    pub sun_sign_id: u32,
    pub sun_sign_lord: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zodiac_sign: Option<String>,
    pub ascendant_sign: String,
    pub ascendant_sign_id: u32,
    pub ascendant_sign_lord: String,
    pub planetary_positions: Vec<PlanetPosition>,
}

/// Subset of chart data returned by the external chart provider.
///
/// Every field is optional: the provider is a best-effort enrichment source and
/// an empty value is a valid (degraded) result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthChartData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moon_sign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moon_sign_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moon_sign_lord: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sun_sign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sun_sign_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sun_sign_lord: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nakshatra: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nakshatra_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nakshatra_pada: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nakshatra_lord: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nakshatra_gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ganam: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal_sign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nadi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lucky_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syllables: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_stone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub western_zodiac: Option<String>,
}

impl BirthChartData {
    /// True when the provider returned nothing usable
    pub fn is_empty(&self) -> bool {
        self.moon_sign.is_none() && self.sun_sign.is_none() && self.nakshatra.is_none()
    }
}
