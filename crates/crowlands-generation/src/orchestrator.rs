//! The generation orchestrator.

use std::sync::Arc;

use crowlands_core::clock::Clock;
use crowlands_core::error::DomainError;
use crowlands_entitlement::{EntitlementLedger, ReserveDecision};
use crowlands_persona::{Persona, PersonaRegistry, compose_image_prompt, compose_ritual_prompt};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::artifact::{ArtifactBody, GeneratedArtifact};
use crate::parse::parse_ritual_document;
use crate::provider::{ImageProvider, ProviderError, TextProvider};

/// One generation request, alive only for the duration of the call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Requesting user.
    pub user_id: Uuid,
    /// Selected guide; `None` uses the neutral voice.
    pub persona_id: Option<String>,
    /// The seeker's free-text intention.
    pub intention: String,
    /// Whether to also render an image.
    pub want_image: bool,
}

/// A successful generation.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// The assembled artifact.
    pub artifact: GeneratedArtifact,
    /// The persona that voiced it; `None` when the neutral guide was used.
    pub persona: Option<Persona>,
    /// Quota left after this generation; `None` for unlimited tiers.
    pub remaining: Option<u32>,
    /// Whether a requested image could not be produced.
    pub image_failed: bool,
}

/// Why a generation did not produce an artifact.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The requested persona is not in the catalog. Checked before any
    /// quota is charged.
    #[error("unknown persona: {0}")]
    PersonaNotFound(String),

    /// The period quota is exhausted.
    #[error("generation quota exhausted")]
    QuotaExhausted {
        /// The configured period limit.
        limit: u32,
    },

    /// The text provider failed. The charged reservation is not refunded.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The ledger could not be read or written.
    #[error("storage failure: {0}")]
    Storage(#[from] DomainError),
}

/// Orchestrates persona resolution, quota reservation, and provider calls.
pub struct GenerationOrchestrator {
    registry: Arc<PersonaRegistry>,
    ledger: EntitlementLedger,
    text: Arc<dyn TextProvider>,
    image: Arc<dyn ImageProvider>,
    clock: Arc<dyn Clock>,
}

impl GenerationOrchestrator {
    /// Wires the orchestrator to its collaborators.
    #[must_use]
    pub fn new(
        registry: Arc<PersonaRegistry>,
        ledger: EntitlementLedger,
        text: Arc<dyn TextProvider>,
        image: Arc<dyn ImageProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            ledger,
            text,
            image,
            clock,
        }
    }

    /// Runs one generation end to end.
    ///
    /// Quota is charged before the text provider is called and is kept on
    /// provider failure; an image failure degrades the response instead of
    /// failing it.
    ///
    /// # Errors
    ///
    /// See [`GenerateError`].
    #[instrument(
        skip(self, request),
        fields(
            user_id = %request.user_id,
            persona = request.persona_id.as_deref().unwrap_or("neutral"),
            want_image = request.want_image,
        )
    )]
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, GenerateError> {
        // Persona lookup is free and side-effect-less, so an invalid id
        // cannot burn quota.
        let persona = match &request.persona_id {
            Some(id) => Some(
                self.registry
                    .get(id)
                    .ok_or_else(|| GenerateError::PersonaNotFound(id.clone()))?,
            ),
            None => None,
        };

        let now = self.clock.now();
        let remaining = match self.ledger.reserve(request.user_id, now).await? {
            ReserveDecision::Denied { limit } => {
                info!(limit, "generation denied: quota exhausted");
                return Err(GenerateError::QuotaExhausted { limit });
            }
            ReserveDecision::Granted { remaining } => remaining,
        };

        let voice = persona.unwrap_or_else(|| self.registry.neutral());
        let prompt = compose_ritual_prompt(voice, &request.intention);

        let raw = self
            .text
            .complete(&prompt.system, &prompt.user)
            .await
            .inspect_err(|err| warn!(error = %err, "text provider call failed"))?;

        let body = match parse_ritual_document(&raw) {
            Ok(document) => ArtifactBody::Ritual(document),
            Err(err) => {
                info!(error = %err, "provider output did not parse; keeping raw text");
                ArtifactBody::Unparsed { raw_text: raw }
            }
        };

        let mut image = None;
        let mut image_failed = false;
        if request.want_image {
            let subject = match &body {
                ArtifactBody::Ritual(document) => document.title.as_str(),
                ArtifactBody::Unparsed { .. } => request.intention.as_str(),
            };
            match self.image.render(&compose_image_prompt(subject)).await {
                Ok(payload) => image = Some(payload),
                Err(err) => {
                    warn!(error = %err, "image provider call failed; returning artifact without image");
                    image_failed = true;
                }
            }
        }

        Ok(GenerationOutcome {
            artifact: GeneratedArtifact { body, image },
            persona: persona.cloned(),
            remaining,
            image_failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use crowlands_entitlement::{MemoryEntitlementStore, QuotaPolicy};
    use crowlands_test_support::FixedClock;

    use super::*;
    use crate::artifact::ImagePayload;

    const RITUAL_JSON: &str = r#"{
        "title": "A Charm of Quiet Courage",
        "materials": ["a white candle"],
        "steps": [{"instruction": "Light the candle at dusk."}],
        "invocation": "I call the quiet hour.",
        "incantation": "Small acts, gathered, become courage.",
        "closing": "The candle rests; the work is done."
    }"#;

    struct CannedText(&'static str);

    #[async_trait]
    impl TextProvider for CannedText {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
            Ok(self.0.to_owned())
        }
    }

    struct FailingText;

    #[async_trait]
    impl TextProvider for FailingText {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, ProviderError> {
            Err(ProviderError::Network("connection refused".into()))
        }
    }

    struct CannedImage;

    #[async_trait]
    impl ImageProvider for CannedImage {
        async fn render(&self, _prompt: &str) -> Result<ImagePayload, ProviderError> {
            Ok(ImagePayload {
                media_type: "image/png".into(),
                base64: "aGVsbG8=".into(),
            })
        }
    }

    struct FailingImage;

    #[async_trait]
    impl ImageProvider for FailingImage {
        async fn render(&self, _prompt: &str) -> Result<ImagePayload, ProviderError> {
            Err(ProviderError::Failed("no image was generated".into()))
        }
    }

    fn orchestrator(
        text: Arc<dyn TextProvider>,
        image: Arc<dyn ImageProvider>,
        quota: u32,
    ) -> (GenerationOrchestrator, EntitlementLedger) {
        let registry = Arc::new(PersonaRegistry::builtin().unwrap());
        let ledger = EntitlementLedger::new(
            Arc::new(MemoryEntitlementStore::new()),
            QuotaPolicy {
                monthly_limit: quota,
            },
        );
        let clock = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ));
        (
            GenerationOrchestrator::new(registry, ledger.clone(), text, image, clock),
            ledger,
        )
    }

    fn request(persona_id: Option<&str>, want_image: bool) -> GenerationRequest {
        GenerationRequest {
            user_id: Uuid::new_v4(),
            persona_id: persona_id.map(str::to_owned),
            intention: "courage for a difficult meeting".into(),
            want_image,
        }
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_structured_artifact_with_image() {
        // Arrange
        let (orchestrator, _) =
            orchestrator(Arc::new(CannedText(RITUAL_JSON)), Arc::new(CannedImage), 3);

        // Act
        let outcome = orchestrator
            .generate(request(Some("shiggy"), true))
            .await
            .unwrap();

        // Assert
        assert!(!outcome.artifact.body.is_parse_fallback());
        assert!(outcome.artifact.image.is_some());
        assert!(!outcome.image_failed);
        assert_eq!(outcome.persona.unwrap().id, "shiggy");
        assert_eq!(outcome.remaining, Some(2));
    }

    #[tokio::test]
    async fn test_neutral_guide_is_used_when_no_persona_selected() {
        // Arrange
        let (orchestrator, _) =
            orchestrator(Arc::new(CannedText(RITUAL_JSON)), Arc::new(CannedImage), 3);

        // Act
        let outcome = orchestrator.generate(request(None, false)).await.unwrap();

        // Assert
        assert!(outcome.persona.is_none());
        assert!(outcome.artifact.image.is_none());
    }

    #[tokio::test]
    async fn test_quota_exhaustion_denies_without_calling_providers() {
        // Arrange
        let (orchestrator, ledger) =
            orchestrator(Arc::new(FailingText), Arc::new(FailingImage), 0);
        let user = Uuid::new_v4();
        let mut req = request(None, false);
        req.user_id = user;

        // Act — a failing provider would turn this into a provider error if
        // it were ever reached.
        let error = orchestrator.generate(req).await.unwrap_err();

        // Assert
        assert!(matches!(error, GenerateError::QuotaExhausted { limit: 0 }));
        let status = ledger.status(user, now()).await.unwrap();
        assert_eq!(status.remaining, Some(0));
    }

    #[tokio::test]
    async fn test_provider_failure_does_not_refund_the_reservation() {
        // Arrange
        let (orchestrator, ledger) =
            orchestrator(Arc::new(FailingText), Arc::new(CannedImage), 3);
        let user = Uuid::new_v4();
        let mut req = request(None, false);
        req.user_id = user;

        // Act
        let error = orchestrator.generate(req).await.unwrap_err();

        // Assert
        assert!(matches!(error, GenerateError::Provider(_)));
        let status = ledger.status(user, now()).await.unwrap();
        assert_eq!(status.remaining, Some(2));
    }

    #[tokio::test]
    async fn test_unknown_persona_fails_before_charging_quota() {
        // Arrange
        let (orchestrator, ledger) =
            orchestrator(Arc::new(CannedText(RITUAL_JSON)), Arc::new(CannedImage), 3);
        let user = Uuid::new_v4();
        let mut req = request(Some("morgana"), false);
        req.user_id = user;

        // Act
        let error = orchestrator.generate(req).await.unwrap_err();

        // Assert
        assert!(matches!(error, GenerateError::PersonaNotFound(_)));
        let status = ledger.status(user, now()).await.unwrap();
        assert_eq!(status.remaining, Some(3));
    }

    #[tokio::test]
    async fn test_unparsable_output_degrades_to_raw_text_fallback() {
        // Arrange
        let (orchestrator, _) = orchestrator(
            Arc::new(CannedText("light a candle and breathe")),
            Arc::new(CannedImage),
            3,
        );

        // Act
        let outcome = orchestrator.generate(request(None, false)).await.unwrap();

        // Assert
        match &outcome.artifact.body {
            ArtifactBody::Unparsed { raw_text } => {
                assert_eq!(raw_text, "light a candle and breathe");
            }
            other => panic!("expected raw-text fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_image_failure_returns_artifact_without_image() {
        // Arrange
        let (orchestrator, _) =
            orchestrator(Arc::new(CannedText(RITUAL_JSON)), Arc::new(FailingImage), 3);

        // Act
        let outcome = orchestrator
            .generate(request(Some("theresa"), true))
            .await
            .unwrap();

        // Assert
        assert!(outcome.artifact.image.is_none());
        assert!(outcome.image_failed);
        assert!(!outcome.artifact.body.is_parse_fallback());
    }

    #[tokio::test]
    async fn test_third_reservation_succeeds_and_fourth_is_denied() {
        // Arrange
        let (orchestrator, ledger) =
            orchestrator(Arc::new(CannedText(RITUAL_JSON)), Arc::new(CannedImage), 3);
        let user = Uuid::new_v4();

        // Act — consume the full quota, then one more.
        for expected_remaining in [2, 1, 0] {
            let mut req = request(None, false);
            req.user_id = user;
            let outcome = orchestrator.generate(req).await.unwrap();
            assert_eq!(outcome.remaining, Some(expected_remaining));
        }
        let mut req = request(None, false);
        req.user_id = user;
        let error = orchestrator.generate(req).await.unwrap_err();

        // Assert
        assert!(matches!(error, GenerateError::QuotaExhausted { limit: 3 }));
        let status = ledger.status(user, now()).await.unwrap();
        assert_eq!(status.remaining, Some(0));
    }
}
