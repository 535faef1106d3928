use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};

use crate::archetype::ArchetypeTemplate;

const BUNDLED_TEMPLATES: &str = include_str!("defaults.json");

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed parsing archetype document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no archetypes found")]
    Empty,
    #[error("archetype #{index}: name is required")]
    MissingName { index: usize },
    #[error("archetype {name}: win_condition is required")]
    MissingWinCondition { name: String },
    #[error("archetype {name}: invalid elixir range [{min}, {max}]")]
    InvalidElixirRange { name: String, min: f64, max: f64 },
    #[error("no enabled archetypes")]
    NoneEnabled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateDocument {
    pub version: u32,
    pub archetypes: Vec<ArchetypeTemplate>,
}

impl TemplateDocument {
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.archetypes.is_empty() {
            return Err(TemplateError::Empty);
        }
        for (index, archetype) in self.archetypes.iter().enumerate() {
            if archetype.name.trim().is_empty() {
                return Err(TemplateError::MissingName { index });
            }
            if archetype.win_condition.trim().is_empty() {
                return Err(TemplateError::MissingWinCondition {
                    name: archetype.name.clone(),
                });
            }
            let (min, max) = (archetype.min_elixir, archetype.max_elixir);
            if !(0.0..=10.0).contains(&min) || !(0.0..=10.0).contains(&max) || min > max {
                return Err(TemplateError::InvalidElixirRange {
                    name: archetype.name.clone(),
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Validated, enabled-only archetype templates. Immutable once built; share via `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchetypeTemplateStore {
    version: u32,
    fingerprint: String,
    templates: Vec<ArchetypeTemplate>,
    by_card: BTreeMap<String, Vec<usize>>,
}

impl ArchetypeTemplateStore {
    pub fn bundled_json() -> &'static str {
        BUNDLED_TEMPLATES
    }

    pub fn bundled() -> Result<Self, TemplateError> {
        Self::from_json(BUNDLED_TEMPLATES)
    }

    pub fn from_json(raw: &str) -> Result<Self, TemplateError> {
        let document: TemplateDocument = serde_json::from_str(raw)?;
        Self::from_document(document)
    }

    pub fn from_document(document: TemplateDocument) -> Result<Self, TemplateError> {
        document.validate()?;
        let total = document.archetypes.len();
        let templates: Vec<ArchetypeTemplate> = document
            .archetypes
            .into_iter()
            .filter(|t| {
                if !t.enabled {
                    warn!(archetype = t.name.as_str(), "skipping disabled archetype");
                }
                t.enabled
            })
            .collect();
        if templates.is_empty() {
            return Err(TemplateError::NoneEnabled);
        }

        let mut by_card: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, template) in templates.iter().enumerate() {
            for card in template.all_cards() {
                by_card.entry(card.to_string()).or_default().push(idx);
            }
        }

        let canonical = serde_json::to_string(&templates)?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let fingerprint = format!("{:x}", hasher.finalize());

        info!(
            version = document.version,
            enabled = templates.len(),
            total,
            "loaded archetype templates"
        );
        Ok(Self {
            version: document.version,
            fingerprint,
            templates,
            by_card,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn templates(&self) -> &[ArchetypeTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn by_name(&self, name: &str) -> Option<&ArchetypeTemplate> {
        self.templates
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn templates_containing(&self, card: &str) -> Vec<&ArchetypeTemplate> {
        self.by_card
            .get(card)
            .map(|indices| indices.iter().map(|idx| &self.templates[*idx]).collect())
            .unwrap_or_default()
    }

    pub fn to_document(&self) -> TemplateDocument {
        TemplateDocument {
            version: self.version,
            archetypes: self.templates.clone(),
        }
    }
}
