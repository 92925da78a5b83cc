//! Persona records.

use serde::{Deserialize, Serialize};

/// A named guide whose voice biases generated rituals.
///
/// Immutable after catalog load. The `id` is a stable slug used in request
/// parameters and saved-spell attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Stable slug, e.g. `"shiggy"`.
    pub id: String,
    /// Full display name.
    pub name: String,
    /// Honorific title, e.g. `"The Psychic Matriarch"`.
    pub title: String,
    /// Voice descriptor interpolated into the provider prompt.
    pub voice: VoiceProfile,
    /// Specialty tags shown as example-prompt suggestions.
    #[serde(default)]
    pub specialties: Vec<String>,
    /// Ready-made intentions a client may offer the visitor.
    #[serde(default)]
    pub sample_prompts: Vec<String>,
}

/// Structured description of how a persona speaks and works.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Historical era the persona inhabits.
    pub era: String,
    /// How the persona structures rituals.
    pub ritual_style: String,
    /// The persona's message to the seeker, quoted in the system prompt.
    pub guiding_message: String,
    /// Core beliefs, in catalog order.
    #[serde(default)]
    pub tenets: Vec<String>,
    /// Historical traditions the persona draws on.
    #[serde(default)]
    pub historical_sources: Vec<String>,
}
