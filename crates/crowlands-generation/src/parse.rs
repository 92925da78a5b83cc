//! Parsing provider output into the ritual document shape.

use crate::artifact::RitualDocument;

/// Providers asked for JSON sometimes wrap it in a Markdown code fence;
/// tolerate that before handing the text to serde.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parses a provider response into a [`RitualDocument`].
///
/// # Errors
///
/// Returns the serde error when the response does not match the expected
/// shape; callers degrade to the raw-text fallback rather than discarding
/// the response.
pub fn parse_ritual_document(raw: &str) -> Result<RitualDocument, serde_json::Error> {
    serde_json::from_str(strip_code_fence(raw))
}
