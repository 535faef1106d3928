pub mod builder;
pub mod upgrades;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::scoring::Role;
use crate::types::Rarity;

pub use builder::{DeckBuilder, DECK_SIZE};
pub use upgrades::{suggest_deck_upgrades, DeckUpgradeSuggestion};

pub const DEFAULT_EVOLUTION_SLOTS: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildOptions {
    #[serde(default)]
    pub unlocked_evolutions: Vec<String>,
    #[serde(default = "default_evolution_slots")]
    pub evolution_slot_limit: usize,
    #[serde(default)]
    pub include_cards: Vec<String>,
    #[serde(default)]
    pub exclude_cards: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            unlocked_evolutions: Vec::new(),
            evolution_slot_limit: DEFAULT_EVOLUTION_SLOTS,
            include_cards: Vec::new(),
            exclude_cards: Vec::new(),
        }
    }
}

impl BuildOptions {
    pub fn has_unlocked_evolution(&self, card: &str) -> bool {
        self.unlocked_evolutions
            .iter()
            .any(|name| name.eq_ignore_ascii_case(card))
    }
}

fn default_evolution_slots() -> usize {
    DEFAULT_EVOLUTION_SLOTS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardDetail {
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    pub rarity: Rarity,
    pub elixir: u32,
    pub role: Role,
    pub score: f64,
    #[serde(default)]
    pub evolution_level: u32,
    #[serde(default)]
    pub max_evolution_level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeckRecommendation {
    pub player_tag: String,
    pub deck: Vec<String>,
    pub cards: Vec<CardDetail>,
    pub average_elixir: f64,
    #[serde(default)]
    pub evolution_slots: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub upgrades: Vec<DeckUpgradeSuggestion>,
    pub built_at: DateTime<Utc>,
}

impl DeckRecommendation {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.deck.len() != DECK_SIZE || self.cards.len() != DECK_SIZE {
            return Err(AnalysisError::Structural(format!(
                "deck has {} cards, expected {DECK_SIZE}",
                self.deck.len()
            )));
        }
        let unique: BTreeSet<&str> = self.deck.iter().map(String::as_str).collect();
        if unique.len() != self.deck.len() {
            return Err(AnalysisError::Structural(
                "deck contains duplicate cards".to_string(),
            ));
        }
        if !(0.0..=10.0).contains(&self.average_elixir) {
            return Err(AnalysisError::Structural(format!(
                "average elixir {} outside [0, 10]",
                self.average_elixir
            )));
        }
        Ok(())
    }

    pub fn roles(&self) -> Vec<Role> {
        self.cards.iter().map(|c| c.role).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::deck::{CardDetail, DeckRecommendation};
    use crate::error::AnalysisError;
    use crate::scoring::Role;
    use crate::types::Rarity;

    fn recommendation(names: &[&str], average_elixir: f64) -> DeckRecommendation {
        DeckRecommendation {
            player_tag: "#TAG".to_string(),
            deck: names.iter().map(|n| n.to_string()).collect(),
            cards: names
                .iter()
                .map(|n| CardDetail {
                    name: n.to_string(),
                    level: 11,
                    max_level: 14,
                    rarity: Rarity::Common,
                    elixir: 3,
                    role: Role::Support,
                    score: 1.0,
                    evolution_level: 0,
                    max_evolution_level: 0,
                })
                .collect(),
            average_elixir,
            evolution_slots: Vec::new(),
            notes: Vec::new(),
            upgrades: Vec::new(),
            built_at: Utc::now(),
        }
    }

    #[test]
    fn validation_catches_structural_problems() {
        let ok = recommendation(&["a", "b", "c", "d", "e", "f", "g", "h"], 3.0);
        assert!(ok.validate().is_ok());

        let short = recommendation(&["a", "b", "c"], 3.0);
        assert!(matches!(short.validate(), Err(AnalysisError::Structural(_))));

        let dupes = recommendation(&["a", "a", "c", "d", "e", "f", "g", "h"], 3.0);
        assert!(matches!(dupes.validate(), Err(AnalysisError::Structural(_))));

        let heavy = recommendation(&["a", "b", "c", "d", "e", "f", "g", "h"], 10.5);
        assert!(matches!(heavy.validate(), Err(AnalysisError::Structural(_))));

        let nan = recommendation(&["a", "b", "c", "d", "e", "f", "g", "h"], f64::NAN);
        assert!(nan.validate().is_err());
    }
}
