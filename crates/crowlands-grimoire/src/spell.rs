//! Saved-spell records.

use chrono::{DateTime, Utc};
use crowlands_generation::GeneratedArtifact;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The guide a spell is attributed to. `None` on a [`SavedSpell`] means the
/// neutral voice was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaAttribution {
    /// Persona slug at save time.
    pub id: String,
    /// Display name at save time.
    pub name: String,
    /// Title at save time.
    pub title: String,
}

/// A generated artifact a user chose to keep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSpell {
    /// Record identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// The kept artifact, exactly as generated.
    pub artifact: GeneratedArtifact,
    /// The guide that voiced it, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<PersonaAttribution>,
    /// When the user saved it.
    pub saved_at: DateTime<Utc>,
}
