pub mod store;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::providers::strategy::Strategy;

pub use store::{ArchetypeTemplateStore, TemplateDocument, TemplateError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeCategory {
    Beatdown,
    Cycle,
    Siege,
    BridgeSpam,
    Bait,
    Control,
    Spell,
    Hybrid,
}

impl Display for ArchetypeCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Beatdown => "Beatdown",
            Self::Cycle => "Cycle",
            Self::Siege => "Siege",
            Self::BridgeSpam => "Bridge Spam",
            Self::Bait => "Bait",
            Self::Control => "Control",
            Self::Spell => "Spell",
            Self::Hybrid => "Hybrid",
        };
        write!(f, "{display}")
    }
}

/// Where a card sits inside a template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TemplateSlot {
    WinCondition,
    Support,
    Required,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchetypeTemplate {
    pub name: String,
    pub win_condition: String,
    #[serde(default)]
    pub support_cards: Vec<String>,
    #[serde(default)]
    pub required_cards: Vec<String>,
    pub min_elixir: f64,
    pub max_elixir: f64,
    pub category: ArchetypeCategory,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_strategy: Option<Strategy>,
}

fn default_enabled() -> bool {
    true
}

impl ArchetypeTemplate {
    /// Win condition, then support cards, then required cards, without repeats.
    pub fn all_cards(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(
            1 + self.support_cards.len() + self.required_cards.len(),
        );
        let names = std::iter::once(&self.win_condition)
            .chain(self.support_cards.iter())
            .chain(self.required_cards.iter());
        for name in names {
            if !out.contains(&name.as_str()) {
                out.push(name.as_str());
            }
        }
        out
    }

    pub fn slot_of(&self, card: &str) -> Option<TemplateSlot> {
        if self.win_condition == card {
            Some(TemplateSlot::WinCondition)
        } else if self.support_cards.iter().any(|c| c == card) {
            Some(TemplateSlot::Support)
        } else if self.required_cards.iter().any(|c| c == card) {
            Some(TemplateSlot::Required)
        } else {
            None
        }
    }

    pub fn contains(&self, card: &str) -> bool {
        self.slot_of(card).is_some()
    }

    pub fn elixir_midpoint(&self) -> f64 {
        (self.min_elixir + self.max_elixir) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use crate::archetype::{ArchetypeCategory, ArchetypeTemplate, TemplateSlot};

    fn template() -> ArchetypeTemplate {
        ArchetypeTemplate {
            name: "Hog Rider Cycle".to_string(),
            win_condition: "Hog Rider".to_string(),
            support_cards: vec!["Cannon".to_string(), "Skeletons".to_string()],
            required_cards: vec!["Skeletons".to_string(), "Fireball".to_string()],
            min_elixir: 2.4,
            max_elixir: 3.2,
            category: ArchetypeCategory::Cycle,
            enabled: true,
            preferred_strategy: None,
        }
    }

    #[test]
    fn all_cards_are_unique_and_ordered() {
        let t = template();
        assert_eq!(
            t.all_cards(),
            vec!["Hog Rider", "Cannon", "Skeletons", "Fireball"]
        );
    }

    #[test]
    fn slot_lookup_prefers_win_condition_then_support() {
        let t = template();
        assert_eq!(t.slot_of("Hog Rider"), Some(TemplateSlot::WinCondition));
        assert_eq!(t.slot_of("Skeletons"), Some(TemplateSlot::Support));
        assert_eq!(t.slot_of("Fireball"), Some(TemplateSlot::Required));
        assert!(!t.contains("Golem"));
        assert!((t.elixir_midpoint() - 2.8).abs() < 1e-9);
    }
}
