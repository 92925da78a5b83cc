//! Persona catalog loading and lookup.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::persona::Persona;

/// The catalog that ships with the binary. Operators may override it with
/// the `PERSONA_CATALOG` environment variable.
const BUILTIN_CATALOG: &str = include_str!("../catalog/personas.yaml");

/// Errors raised while loading or validating a persona catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read persona catalog: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog document is not valid YAML for the expected shape.
    #[error("failed to parse persona catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The catalog parsed but violates a structural rule.
    #[error("invalid persona catalog: {0}")]
    Invalid(String),
}

/// On-disk shape of the catalog document.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    /// The voice used when the visitor selects no guide.
    neutral: Persona,
    /// Selectable guides, in presentation order.
    personas: Vec<Persona>,
}

/// Read-only persona catalog, fully validated at construction.
#[derive(Debug)]
pub struct PersonaRegistry {
    neutral: Persona,
    personas: Vec<Persona>,
    by_id: HashMap<String, usize>,
}

impl PersonaRegistry {
    /// Loads the catalog that is compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the embedded document is malformed; this
    /// indicates a packaging defect and should fail startup.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// Loads a catalog from a YAML file on disk.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on I/O, parse, or validation failure.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    /// Parses and validates a catalog from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` on malformed YAML and
    /// `CatalogError::Invalid` on duplicate or empty identifiers, empty
    /// display fields, or an empty persona list.
    pub fn from_yaml(raw: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_yaml::from_str(raw)?;
        validate(&document)?;

        let by_id = document
            .personas
            .iter()
            .enumerate()
            .map(|(index, persona)| (persona.id.clone(), index))
            .collect();

        Ok(Self {
            neutral: document.neutral,
            personas: document.personas,
            by_id,
        })
    }

    /// Looks up a persona by slug.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.by_id.get(id).map(|&index| &self.personas[index])
    }

    /// All selectable personas, in catalog order.
    #[must_use]
    pub fn list(&self) -> &[Persona] {
        &self.personas
    }

    /// The voice used when no guide is selected.
    #[must_use]
    pub fn neutral(&self) -> &Persona {
        &self.neutral
    }
}

fn validate(document: &CatalogDocument) -> Result<(), CatalogError> {
    if document.personas.is_empty() {
        return Err(CatalogError::Invalid("catalog has no personas".into()));
    }

    let mut seen = HashMap::new();
    for persona in std::iter::once(&document.neutral).chain(&document.personas) {
        require(&persona.id, "id", &persona.id)?;
        require(&persona.name, "name", &persona.id)?;
        require(&persona.title, "title", &persona.id)?;
        require(&persona.voice.ritual_style, "voice.ritual_style", &persona.id)?;
        require(&persona.voice.guiding_message, "voice.guiding_message", &persona.id)?;

        if seen.insert(persona.id.clone(), ()).is_some() {
            return Err(CatalogError::Invalid(format!(
                "duplicate persona id: {}",
                persona.id
            )));
        }
    }

    Ok(())
}

fn require(value: &str, field: &str, id: &str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::Invalid(format!(
            "persona {id:?} has an empty {field}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_catalog(personas: &str) -> String {
        format!(
            r"
neutral:
  id: neutral
  name: The Crowlands Guide
  title: Keeper of the Commons
  voice:
    era: Timeless
    ritual_style: Plain, practical formulas.
    guiding_message: Magic is a science of intention.
personas:
{personas}"
        )
    }

    const ONE_PERSONA: &str = r"
  - id: shiggy
    name: Sheila Tayler
    title: The Psychic Matriarch
    voice:
      era: Post-War London
      ritual_style: Poetry and practical action.
      guiding_message: Courage is found in small acts.
";

    #[test]
    fn test_builtin_catalog_loads_and_validates() {
        let registry = PersonaRegistry::builtin().unwrap();

        assert!(!registry.list().is_empty());
        assert_eq!(registry.neutral().id, "neutral");
    }

    #[test]
    fn test_list_preserves_catalog_order() {
        let registry = PersonaRegistry::builtin().unwrap();

        let ids: Vec<&str> = registry.list().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["shiggy", "kathleen", "catherine", "theresa"]);
    }

    #[test]
    fn test_get_returns_persona_by_slug() {
        let registry = PersonaRegistry::from_yaml(&minimal_catalog(ONE_PERSONA)).unwrap();

        let persona = registry.get("shiggy").unwrap();
        assert_eq!(persona.name, "Sheila Tayler");
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let doubled = format!("{ONE_PERSONA}{ONE_PERSONA}");
        let result = PersonaRegistry::from_yaml(&minimal_catalog(&doubled));

        assert!(matches!(result, Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn test_empty_required_field_is_rejected() {
        let blank_title = ONE_PERSONA.replace("The Psychic Matriarch", "\"\"");
        let result = PersonaRegistry::from_yaml(&minimal_catalog(&blank_title));

        assert!(matches!(result, Err(CatalogError::Invalid(_))));
    }

    #[test]
    fn test_empty_persona_list_is_rejected() {
        let result = PersonaRegistry::from_yaml(&minimal_catalog("  []"));

        assert!(matches!(result, Err(CatalogError::Invalid(_))));
    }
}
