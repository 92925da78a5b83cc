//! `PostgreSQL` spell store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crowlands_core::error::DomainError;
use crowlands_generation::GeneratedArtifact;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::spell::{PersonaAttribution, SavedSpell};
use crate::store::{DeleteOutcome, SpellStore};

/// Postgres-backed spell store. The artifact is kept as a JSONB document so
/// its shape can evolve without migrations; attribution columns stay flat
/// for listing.
#[derive(Debug, Clone)]
pub struct PgSpellStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct SpellRow {
    id: Uuid,
    user_id: Uuid,
    artifact: Json<GeneratedArtifact>,
    persona_id: Option<String>,
    persona_name: Option<String>,
    persona_title: Option<String>,
    saved_at: DateTime<Utc>,
}

impl SpellRow {
    fn into_spell(self) -> SavedSpell {
        let persona = match (self.persona_id, self.persona_name, self.persona_title) {
            (Some(id), Some(name), Some(title)) => Some(PersonaAttribution { id, name, title }),
            _ => None,
        };
        SavedSpell {
            id: self.id,
            user_id: self.user_id,
            artifact: self.artifact.0,
            persona,
            saved_at: self.saved_at,
        }
    }
}

impl PgSpellStore {
    /// Creates a store over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpellStore for PgSpellStore {
    async fn save(
        &self,
        user_id: Uuid,
        artifact: GeneratedArtifact,
        persona: Option<PersonaAttribution>,
        now: DateTime<Utc>,
    ) -> Result<Uuid, DomainError> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO saved_spells
               (id, user_id, artifact, persona_id, persona_name, persona_title, saved_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id)
        .bind(user_id)
        .bind(Json(&artifact))
        .bind(persona.as_ref().map(|p| p.id.as_str()))
        .bind(persona.as_ref().map(|p| p.name.as_str()))
        .bind(persona.as_ref().map(|p| p.title.as_str()))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DomainError::infrastructure)?;
        Ok(id)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<SavedSpell>, DomainError> {
        let rows: Vec<SpellRow> = sqlx::query_as(
            "SELECT id, user_id, artifact, persona_id, persona_name, persona_title, saved_at
             FROM saved_spells
             WHERE user_id = $1
             ORDER BY saved_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::infrastructure)?;

        Ok(rows.into_iter().map(SpellRow::into_spell).collect())
    }

    async fn delete(&self, user_id: Uuid, spell_id: Uuid) -> Result<DeleteOutcome, DomainError> {
        let result = sqlx::query(
            "DELETE FROM saved_spells
             WHERE id = $1 AND user_id = $2",
        )
        .bind(spell_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(DomainError::infrastructure)?;

        if result.rows_affected() > 0 {
            Ok(DeleteOutcome::Removed)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }
}
