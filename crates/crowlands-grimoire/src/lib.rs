//! Crowlands Grimoire — saved-spell persistence.
//!
//! A saved spell is a generated artifact a user chose to keep, with the
//! persona that voiced it and a save timestamp. Saving is not metered;
//! records are created and deleted only by explicit user action and are
//! visible only to their owner.

pub mod memory;
pub mod pg;
pub mod spell;
pub mod store;

pub use memory::MemorySpellStore;
pub use pg::PgSpellStore;
pub use spell::{PersonaAttribution, SavedSpell};
pub use store::{DeleteOutcome, SpellStore};
