pub mod analyzer;
pub mod unlock;

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::archetype::TemplateSlot;
use crate::scoring::Role;
use crate::types::Rarity;

pub use analyzer::UpgradeImpactAnalyzer;

/// Options for one impact analysis. Viability here is on a 0..1 scale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpactOptions {
    #[serde(default = "default_viability_threshold")]
    pub viability_threshold: f64,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub include_max_level: bool,
    /// Empty keeps every rarity.
    #[serde(default)]
    pub focus_rarities: Vec<Rarity>,
    #[serde(default)]
    pub exclude_cards: Vec<String>,
}

impl Default for ImpactOptions {
    fn default() -> Self {
        Self {
            viability_threshold: default_viability_threshold(),
            top_n: default_top_n(),
            include_max_level: false,
            focus_rarities: Vec::new(),
            exclude_cards: Vec::new(),
        }
    }
}

fn default_viability_threshold() -> f64 {
    0.75
}

fn default_top_n() -> usize {
    10
}

impl ImpactOptions {
    pub fn with_threshold(mut self, viability_threshold: f64) -> Self {
        self.viability_threshold = viability_threshold;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn accepts_rarity(&self, rarity: Rarity) -> bool {
        self.focus_rarities.is_empty() || self.focus_rarities.contains(&rarity)
    }

    pub fn excludes(&self, card: &str) -> bool {
        self.exclude_cards.iter().any(|c| c == card)
    }
}

/// How one +1 upgrade moves one archetype's composite score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeckImpactSummary {
    pub archetype: String,
    pub win_condition: String,
    pub card_role: TemplateSlot,
    pub current_score: f64,
    pub projected_score: f64,
    pub score_delta: f64,
    pub becomes_viable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardUpgradeImpact {
    pub card_name: String,
    pub rarity: Rarity,
    pub current_level: u32,
    pub max_level: u32,
    pub upgraded_level: u32,
    pub elixir: u32,
    pub role: Role,
    pub score_delta: f64,
    pub viable_decks_count: usize,
    pub avg_deck_improvement: f64,
    pub max_deck_improvement: f64,
    pub unlock_potential: usize,
    pub impact_score: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_decks: Vec<DeckImpactSummary>,
    pub gold_cost: u64,
    pub value_per_gold: f64,
    pub is_key_card: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unlocks_archetypes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyCard {
    pub card_name: String,
    pub rarity: Rarity,
    pub current_level: u32,
    pub unlocked_archetypes: Vec<String>,
    pub deck_unlock_count: usize,
    pub impact_score: f64,
}

impl KeyCard {
    pub fn from_impact(impact: &CardUpgradeImpact) -> Self {
        Self {
            card_name: impact.card_name.clone(),
            rarity: impact.rarity,
            current_level: impact.current_level,
            unlocked_archetypes: impact.unlocks_archetypes.clone(),
            deck_unlock_count: impact.unlock_potential,
            impact_score: impact.impact_score,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum UnlockStatus {
    Viable,
    Marginal,
    Blocked,
}

impl Display for UnlockStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Viable => "viable",
            Self::Marginal => "marginal",
            Self::Blocked => "blocked",
        };
        write!(f, "{display}")
    }
}

/// Per-archetype view of which upgrades open it up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnlockNode {
    pub archetype: String,
    pub status: UnlockStatus,
    pub current_score: f64,
    pub upgrades_needed: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_upgrade: Option<String>,
    pub estimated_gold: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImpactSummary {
    pub total_cards_analyzed: usize,
    pub key_cards_identified: usize,
    pub avg_impact_score: f64,
    pub max_impact_score: f64,
    pub total_viable_decks: usize,
    pub potential_unlocks: usize,
}

impl ImpactSummary {
    pub fn from_impacts(impacts: &[CardUpgradeImpact], key_cards: usize) -> Self {
        if impacts.is_empty() {
            return Self::default();
        }
        let total: f64 = impacts.iter().map(|i| i.impact_score).sum();
        Self {
            total_cards_analyzed: impacts.len(),
            key_cards_identified: key_cards,
            avg_impact_score: total / impacts.len() as f64,
            max_impact_score: impacts
                .iter()
                .map(|i| i.impact_score)
                .fold(0.0, f64::max),
            total_viable_decks: impacts.iter().map(|i| i.viable_decks_count).sum(),
            potential_unlocks: impacts.iter().map(|i| i.unlock_potential).sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpgradeImpactAnalysis {
    pub player_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    pub analysis_time: DateTime<Utc>,
    pub card_impacts: Vec<CardUpgradeImpact>,
    pub key_cards: Vec<KeyCard>,
    pub unlock_tree: Vec<UnlockNode>,
    pub top_impacts: Vec<CardUpgradeImpact>,
    pub summary: ImpactSummary,
}

#[cfg(test)]
mod tests {
    use crate::impact::ImpactOptions;
    use crate::types::Rarity;

    #[test]
    fn options_default_and_filters() {
        let options = ImpactOptions::default();
        assert!((options.viability_threshold - 0.75).abs() < 1e-9);
        assert_eq!(options.top_n, 10);
        assert!(options.accepts_rarity(Rarity::Epic));

        let focused = ImpactOptions {
            focus_rarities: vec![Rarity::Legendary],
            exclude_cards: vec!["Zap".to_string()],
            ..ImpactOptions::default()
        };
        assert!(!focused.accepts_rarity(Rarity::Epic));
        assert!(focused.accepts_rarity(Rarity::Legendary));
        assert!(focused.excludes("Zap"));
        assert!(!focused.excludes("Log"));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: ImpactOptions =
            serde_json::from_str(r#"{"focus_rarities": ["legendary"]}"#).expect("valid options");
        assert_eq!(options.focus_rarities, vec![Rarity::Legendary]);
        assert_eq!(options.top_n, 10);
    }
}
