//! Prompt assembly for the forecast provider
//!
//! Pure text plumbing: chart context flows into the user prompt, the voice
//! and format rules live in the system prompt.

use jyotish_common::BirthChartData;

/// Voice and format rules for the provider
pub fn build_system_prompt() -> &'static str {
    "\
You generate concise, psychologically precise annual previews inspired by Indian Jyotish.

This is a free forecast meant to make the reader feel seen, oriented, and unfinished.
It should surface pressure and contradiction without resolving anything.
Your voice is calm, grounded, and discerning. Never mystical. Never promotional.

Hard rules:
- Plain human language only
- Always produce visible text
- Do NOT mention astrology, signs, planets, or systems
- Do NOT give advice or instructions
- Do NOT predict literal events

INTERNAL LOGIC (DO NOT REVEAL):
- Sun placement shapes identity orientation and what the person insists on being
- Moon placement shapes emotional pacing and how pressure is processed
- Nakshatra placement defines moral limits and where compromise becomes costly
- A single pivotal life theme anchors where pressure concentrates

If the output could plausibly apply to many people, revise until it cannot.

Call the save_forecast function with your response."
}

/// Context the user prompt is assembled from
pub struct PromptContext<'a> {
    pub chart: &'a BirthChartData,
    pub pivotal_life_element: &'a str,
}

/// Assemble the user prompt from whatever chart context is available
pub fn build_user_prompt(ctx: &PromptContext<'_>) -> String {
    let field = |value: &Option<String>| -> String {
        value.clone().unwrap_or_else(|| "unknown".to_string())
    };

    format!(
        "\
Write a personalized forecast.

INPUTS:
- Sun sign: {sun}
- Sun sign lord: {sun_lord}
- Moon sign: {moon}
- Moon sign lord: {moon_lord}
- Nakshatra: {nakshatra}
- Nakshatra lord: {nakshatra_lord}
- Nakshatra animal (optional): {animal}
- Pivotal life theme: {theme}

LENGTH:
- 220-260 words total across all fields
- Each field should contain natural, flowing prose

Return the five sections through the save_forecast function only.",
        sun = field(&ctx.chart.sun_sign),
        sun_lord = field(&ctx.chart.sun_sign_lord),
        moon = field(&ctx.chart.moon_sign),
        moon_lord = field(&ctx.chart.moon_sign_lord),
        nakshatra = field(&ctx.chart.nakshatra),
        nakshatra_lord = field(&ctx.chart.nakshatra_lord),
        animal = ctx.chart.animal_sign.as_deref().unwrap_or("none"),
        theme = ctx.pivotal_life_element,
    )
}
