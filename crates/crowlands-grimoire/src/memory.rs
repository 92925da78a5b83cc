//! In-memory spell store for tests and local development.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crowlands_core::error::DomainError;
use crowlands_generation::GeneratedArtifact;
use uuid::Uuid;

use crate::spell::{PersonaAttribution, SavedSpell};
use crate::store::{DeleteOutcome, SpellStore};

/// Mutex-guarded list of saved spells.
#[derive(Debug, Default)]
pub struct MemorySpellStore {
    spells: Mutex<Vec<SavedSpell>>,
}

impl MemorySpellStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<SavedSpell>>, DomainError> {
        self.spells
            .lock()
            .map_err(|_| DomainError::Infrastructure("spell lock poisoned".into()))
    }
}

#[async_trait]
impl SpellStore for MemorySpellStore {
    async fn save(
        &self,
        user_id: Uuid,
        artifact: GeneratedArtifact,
        persona: Option<PersonaAttribution>,
        now: DateTime<Utc>,
    ) -> Result<Uuid, DomainError> {
        let id = Uuid::new_v4();
        self.lock()?.push(SavedSpell {
            id,
            user_id,
            artifact,
            persona,
            saved_at: now,
        });
        Ok(id)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<SavedSpell>, DomainError> {
        let spells = self.lock()?;
        let mut owned: Vec<SavedSpell> = spells
            .iter()
            .filter(|spell| spell.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(owned)
    }

    async fn delete(&self, user_id: Uuid, spell_id: Uuid) -> Result<DeleteOutcome, DomainError> {
        let mut spells = self.lock()?;
        let before = spells.len();
        spells.retain(|spell| !(spell.id == spell_id && spell.user_id == user_id));
        if spells.len() < before {
            Ok(DeleteOutcome::Removed)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }
}
