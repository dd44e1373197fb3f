//! Dasha period types and current-period selection
//!
//! Period boundaries come from the external chart provider; this module only
//! selects the period containing a target date. Dates arrive as ISO strings,
//! sometimes with the provider's `+05:30` offset suffix, and comparisons use
//! the calendar date only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One maha dasha period with its nested antar dashas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MahaPeriod {
    /// Ruling planet of the period
    pub name: String,
    /// Period start, ISO date or datetime
    pub start: String,
    /// Period end, ISO date or datetime
    pub end: String,
    #[serde(default)]
    pub antardasha: Vec<AntarPeriod>,
}

/// One antar dasha period inside a maha dasha
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntarPeriod {
    pub name: String,
    pub start: String,
    pub end: String,
}

/// The maha/antar pair active on a given date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentDasha {
    pub maha_dasha: String,
    pub maha_dasha_start: String,
    pub maha_dasha_end: String,
    pub antar_dasha: String,
    pub antar_dasha_start: String,
    pub antar_dasha_end: String,
}

/// Parse a provider date string, tolerating datetime tails and offset suffixes
fn parse_period_date(raw: &str) -> Result<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(raw.to_string()))
}

/// Trim a provider date string to its `YYYY-MM-DD` prefix
fn date_only(raw: &str) -> String {
    raw.chars().take(10).collect()
}

/// Find the maha and antar dasha containing `target`.
///
/// Returns `None` when no maha period contains the date, or when the matching
/// maha has no antar period covering it. Boundary dates are inclusive on both
/// ends, matching the provider's convention of overlapping endpoints.
pub fn select_current(periods: &[MahaPeriod], target: NaiveDate) -> Result<Option<CurrentDasha>> {
    for maha in periods {
        let maha_start = parse_period_date(&maha.start)?;
        let maha_end = parse_period_date(&maha.end)?;

        if maha_start <= target && target <= maha_end {
            for antar in &maha.antardasha {
                let antar_start = parse_period_date(&antar.start)?;
                let antar_end = parse_period_date(&antar.end)?;

                if antar_start <= target && target <= antar_end {
                    return Ok(Some(CurrentDasha {
                        maha_dasha: maha.name.clone(),
                        maha_dasha_start: date_only(&maha.start),
                        maha_dasha_end: date_only(&maha.end),
                        antar_dasha: antar.name.clone(),
                        antar_dasha_start: date_only(&antar.start),
                        antar_dasha_end: date_only(&antar.end),
                    }));
                }
            }
        }
    }

    Ok(None)
}
