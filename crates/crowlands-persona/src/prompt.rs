//! Deterministic prompt composition.
//!
//! The same (persona, intention) pair always yields the same prompt text;
//! all variation in the output comes from the provider, never from here.

use std::fmt::Write;

use crate::persona::Persona;

/// The JSON shape the text provider is instructed to produce. Mirrors
/// `RitualDocument` in the generation crate.
const RESPONSE_SHAPE: &str = r#"{
  "title": "<evocative ritual title>",
  "materials": ["<required item>", ...],
  "steps": [{"instruction": "<what to do>", "duration": "<optional>", "note": "<optional>"}, ...],
  "invocation": "<spoken opening>",
  "incantation": "<spoken main working>",
  "closing": "<spoken closing>",
  "historical_context": {"tradition": "<tradition drawn on>", "sources": [...], "practitioners": [...]},
  "warnings": ["<optional caution>", ...]
}"#;

/// A system/user prompt pair ready for the text provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    /// Persona voice and output-shape instructions.
    pub system: String,
    /// The visitor's intention, framed as a request.
    pub user: String,
}

/// Composes the ritual-generation prompt for a persona and intention.
#[must_use]
pub fn compose_ritual_prompt(persona: &Persona, intention: &str) -> ComposedPrompt {
    let mut system = format!(
        "You are {name}, {title}, a guide of the Crowlands ({era}). \
         Your ritual style: {style} \
         Your message to seekers: \"{message}\"",
        name = persona.name,
        title = persona.title,
        era = persona.voice.era,
        style = persona.voice.ritual_style,
        message = persona.voice.guiding_message,
    );

    if !persona.voice.tenets.is_empty() {
        system.push_str("\n\nYou hold these tenets:");
        for tenet in &persona.voice.tenets {
            let _ = write!(system, "\n- {tenet}");
        }
    }

    if !persona.voice.historical_sources.is_empty() {
        system.push_str("\n\nYou draw on these historical sources:");
        for source in &persona.voice.historical_sources {
            let _ = write!(system, "\n- {source}");
        }
    }

    let _ = write!(
        system,
        "\n\nCraft a complete, practical ritual for the seeker's intention. \
         Ground it in documented practice, keep it safe and actionable, and \
         speak in your own voice. Respond with a single JSON object of \
         exactly this shape and nothing else:\n{RESPONSE_SHAPE}"
    );

    let user = format!("My intention: {intention}");

    ComposedPrompt { system, user }
}

/// Derives the short image prompt for an artifact title, in the product's
/// fixed art direction.
#[must_use]
pub fn compose_image_prompt(subject: &str) -> String {
    format!(
        "1920s-1940s mystical art style, {subject}, art deco influences, \
         rich jewel tones, candlelit atmosphere"
    )
}
