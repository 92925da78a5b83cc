//! Spell storage abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crowlands_core::error::DomainError;
use crowlands_generation::GeneratedArtifact;
use uuid::Uuid;

use crate::spell::{PersonaAttribution, SavedSpell};

/// Outcome of a deletion attempt. Deleting someone else's spell reports
/// `NotFound` rather than revealing its existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The spell existed, belonged to the caller, and was removed.
    Removed,
    /// No such spell for this user.
    NotFound,
}

/// Storage contract for saved spells. Each save creates a new record; there
/// is no overwrite or versioning.
#[async_trait]
pub trait SpellStore: Send + Sync {
    /// Persists an artifact for a user and returns the new record id.
    async fn save(
        &self,
        user_id: Uuid,
        artifact: GeneratedArtifact,
        persona: Option<PersonaAttribution>,
        now: DateTime<Utc>,
    ) -> Result<Uuid, DomainError>;

    /// All of a user's spells, newest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<SavedSpell>, DomainError>;

    /// Removes a spell if it belongs to the user.
    async fn delete(&self, user_id: Uuid, spell_id: Uuid) -> Result<DeleteOutcome, DomainError>;
}
