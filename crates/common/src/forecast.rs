//! Forecast section types and text assembly

use serde::{Deserialize, Serialize};

/// The five named sections the LLM returns through its tool call.
///
/// Fields are optional on the wire; [`ForecastSections::is_usable`] is the
/// acceptance check applied before a response is returned to the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastSections {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub who_you_are_right_now: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whats_happening_in_your_life: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivotal_life_theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub what_is_becoming_tighter_or_less_forgiving: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_hook: Option<String>,
}

impl ForecastSections {
    /// A generation is usable when the opening section carries text
    pub fn is_usable(&self) -> bool {
        self.who_you_are_right_now
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    /// Join the sections into the flat markdown document shown to the reader
    pub fn to_text(&self) -> String {
        let section = |title: &str, body: &Option<String>| {
            format!("## {}\n\n{}", title, body.as_deref().unwrap_or(""))
        };

        [
            section("WHO YOU ARE RIGHT NOW", &self.who_you_are_right_now),
            section(
                "WHAT'S HAPPENING IN YOUR LIFE",
                &self.whats_happening_in_your_life,
            ),
            section("PIVOTAL LIFE THEME", &self.pivotal_life_theme),
            section(
                "WHAT IS BECOMING TIGHTER OR LESS FORGIVING",
                &self.what_is_becoming_tighter_or_less_forgiving,
            ),
            section("UPGRADE HOOK", &self.upgrade_hook),
        ]
        .join("\n\n")
    }
}
