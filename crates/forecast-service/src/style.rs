//! Style seed, pivotal life element, and log-safe hashing

use sha2::{Digest, Sha256};

/// Short deterministic seed: first 4 bytes of SHA-256 as lowercase hex
pub fn style_seed(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(&digest[..4])
}

/// Hash a token for logging without exposing the value
pub fn hash_token(token: &str) -> String {
    style_seed(token)
}

/// Pick the life element the forecast anchors on. Deterministic per
/// (age band, seed) so regenerated previews stay consistent.
pub fn pick_pivotal_life_element(age: i32, seed: &str) -> &'static str {
    let options: &[&'static str] = if age < 35 {
        &["career", "education", "identity"]
    } else if age < 50 {
        &["career", "relationships", "family", "health"]
    } else if age < 60 {
        &["health", "family", "relationships", "purpose"]
    } else {
        &["health", "family", "relationships", "meaning", "stewardship"]
    };

    let seed_num: usize = seed.chars().map(|c| c as usize).sum();
    options[seed_num % options.len()]
}

/// Age by calendar year difference. The input is an ISO datetime or date;
/// only the leading year matters.
pub fn calculate_age(birth_datetime_utc: &str, target_year: i32) -> Option<i32> {
    let year: i32 = birth_datetime_utc.get(..4)?.parse().ok()?;
    Some(target_year - year)
}
