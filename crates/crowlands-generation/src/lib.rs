//! Crowlands Generation — ritual artifact orchestration.
//!
//! Composes a persona-voiced prompt, charges the entitlement ledger, calls
//! the text provider, optionally the image provider, and assembles the
//! structured artifact. Text and image generation are independent failure
//! domains: a lost image never fails a request.

pub mod artifact;
pub mod openai;
pub mod orchestrator;
pub mod parse;
pub mod provider;

pub use artifact::{
    ArtifactBody, GeneratedArtifact, HistoricalContext, ImagePayload, RitualDocument, RitualStep,
};
pub use orchestrator::{
    GenerateError, GenerationOrchestrator, GenerationOutcome, GenerationRequest,
};
pub use provider::{ImageProvider, ProviderError, TextProvider};
