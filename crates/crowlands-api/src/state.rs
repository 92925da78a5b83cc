//! Shared application state.

use std::sync::Arc;

use crowlands_core::clock::Clock;
use crowlands_entitlement::EntitlementLedger;
use crowlands_generation::GenerationOrchestrator;
use crowlands_grimoire::SpellStore;
use crowlands_payment::PaymentConfirmationWorker;
use crowlands_persona::PersonaRegistry;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persona catalog, immutable after startup.
    pub registry: Arc<PersonaRegistry>,
    /// Quota and tier bookkeeping.
    pub ledger: EntitlementLedger,
    /// Ritual generation pipeline.
    pub orchestrator: Arc<GenerationOrchestrator>,
    /// Checkout recording and confirmation.
    pub payments: Arc<PaymentConfirmationWorker>,
    /// Saved-spell persistence.
    pub spells: Arc<dyn SpellStore>,
    /// Time source for quota periods.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        registry: Arc<PersonaRegistry>,
        ledger: EntitlementLedger,
        orchestrator: Arc<GenerationOrchestrator>,
        payments: Arc<PaymentConfirmationWorker>,
        spells: Arc<dyn SpellStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            ledger,
            orchestrator,
            payments,
            spells,
            clock,
        }
    }
}
