//! The generated artifact model.

use serde::{Deserialize, Serialize};

/// One step of a ritual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RitualStep {
    /// What the seeker does.
    pub instruction: String,
    /// How long the step takes, if the provider specified one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Side note for the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Optional historical grounding for a ritual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalContext {
    /// The tradition the ritual draws on.
    pub tradition: String,
    /// Documented sources.
    #[serde(default)]
    pub sources: Vec<String>,
    /// Named practitioners associated with the pattern.
    #[serde(default)]
    pub practitioners: Vec<String>,
}

/// The fully structured ritual document a provider is asked to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RitualDocument {
    /// Ritual title.
    pub title: String,
    /// Required materials, in order.
    #[serde(default)]
    pub materials: Vec<String>,
    /// Ordered steps.
    pub steps: Vec<RitualStep>,
    /// Spoken opening.
    pub invocation: String,
    /// Spoken main working.
    pub incantation: String,
    /// Spoken closing.
    pub closing: String,
    /// Historical grounding, when the provider supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_context: Option<HistoricalContext>,
    /// Cautions for the seeker.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// An embedded generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// MIME type of the encoded image.
    pub media_type: String,
    /// Base64-encoded image bytes.
    pub base64: String,
}

/// The artifact body: either a parsed ritual document or the provider's raw
/// text when it did not match the expected structure. The two cases are
/// mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactBody {
    /// Parsed into the structured shape.
    Ritual(RitualDocument),
    /// Parse failed; the raw response is preserved for the seeker.
    Unparsed {
        /// The provider's response text, verbatim.
        raw_text: String,
    },
}

impl ArtifactBody {
    /// Whether this body is the raw-text fallback.
    #[must_use]
    pub fn is_parse_fallback(&self) -> bool {
        matches!(self, Self::Unparsed { .. })
    }
}

/// A generation result: the body plus an optional image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// Ritual document or raw-text fallback.
    #[serde(flatten)]
    pub body: ArtifactBody,
    /// Generated image, when one was requested and produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImagePayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_document() -> RitualDocument {
        RitualDocument {
            title: "A Charm of Quiet Courage".into(),
            materials: vec!["a white candle".into()],
            steps: vec![RitualStep {
                instruction: "Light the candle at dusk.".into(),
                duration: Some("5 minutes".into()),
                note: None,
            }],
            invocation: "I call the quiet hour.".into(),
            incantation: "Small acts, gathered, become courage.".into(),
            closing: "The candle rests; the work is done.".into(),
            historical_context: None,
            warnings: vec![],
        }
    }

    #[test]
    fn test_structured_body_serializes_with_ritual_kind() {
        let artifact = GeneratedArtifact {
            body: ArtifactBody::Ritual(minimal_document()),
            image: None,
        };

        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["kind"], "ritual");
        assert_eq!(json["title"], "A Charm of Quiet Courage");
        assert!(json.get("raw_text").is_none());
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_fallback_body_serializes_with_unparsed_kind_only() {
        let artifact = GeneratedArtifact {
            body: ArtifactBody::Unparsed {
                raw_text: "the spirits were unstructured today".into(),
            },
            image: None,
        };

        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["kind"], "unparsed");
        assert!(json.get("title").is_none());
        assert!(artifact.body.is_parse_fallback());
    }

    #[test]
    fn test_artifact_round_trips_through_json() {
        let artifact = GeneratedArtifact {
            body: ArtifactBody::Ritual(minimal_document()),
            image: Some(ImagePayload {
                media_type: "image/png".into(),
                base64: "aGVsbG8=".into(),
            }),
        };

        let json = serde_json::to_string(&artifact).unwrap();
        let back: GeneratedArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, artifact);
    }
}
