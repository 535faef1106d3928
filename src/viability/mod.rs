pub mod detector;
pub mod strategies;
pub mod upgrades;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::archetype::ArchetypeCategory;
use crate::providers::{Strategy, SynergyPair};

pub use detector::ArchetypeViabilityDetector;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ViabilityTier {
    Blocked,
    Playable,
    Competitive,
    Optimal,
}

impl ViabilityTier {
    pub const ALL: [ViabilityTier; 4] = [
        ViabilityTier::Optimal,
        ViabilityTier::Competitive,
        ViabilityTier::Playable,
        ViabilityTier::Blocked,
    ];

    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Optimal
        } else if score >= 75.0 {
            Self::Competitive
        } else if score >= 60.0 {
            Self::Playable
        } else {
            Self::Blocked
        }
    }

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Competitive => "competitive",
            Self::Playable => "playable",
            Self::Blocked => "blocked",
        }
    }
}

impl Display for ViabilityTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown viability tier: {0}")]
pub struct TierParseError(pub String);

impl FromStr for ViabilityTier {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "optimal" => Ok(Self::Optimal),
            "competitive" => Ok(Self::Competitive),
            "playable" => Ok(Self::Playable),
            "blocked" => Ok(Self::Blocked),
            _ => Err(TierParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeUrgency {
    Critical,
    High,
    Medium,
    Low,
}

impl Display for UpgradeUrgency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionOptions {
    #[serde(default)]
    pub min_viability: f64,
    #[serde(default = "default_true")]
    pub include_strategies: bool,
    #[serde(default = "default_true")]
    pub include_upgrades: bool,
    #[serde(default = "default_top_upgrades_per_archetype")]
    pub top_upgrades_per_archetype: usize,
    #[serde(default = "default_top_cross_archetype_upgrades")]
    pub top_cross_archetype_upgrades: usize,
    #[serde(default)]
    pub exclude_cards: Vec<String>,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            min_viability: 0.0,
            include_strategies: true,
            include_upgrades: true,
            top_upgrades_per_archetype: default_top_upgrades_per_archetype(),
            top_cross_archetype_upgrades: default_top_cross_archetype_upgrades(),
            exclude_cards: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_top_upgrades_per_archetype() -> usize {
    3
}

fn default_top_cross_archetype_upgrades() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnderleveledCard {
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    pub level_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyRecommendation {
    pub strategy: Strategy,
    pub compatibility_score: f64,
    pub archetype_affinity: f64,
    pub elixir_fit: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchetypeUpgrade {
    pub card_name: String,
    pub current_level: u32,
    pub target_level: u32,
    pub max_level: u32,
    pub viability_gain: f64,
    pub gold_cost: u64,
    pub priority: UpgradeUrgency,
    pub is_win_condition: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectedArchetype {
    pub name: String,
    pub category: ArchetypeCategory,
    pub win_condition: String,
    pub viability_score: f64,
    pub tier: ViabilityTier,
    pub win_condition_score: f64,
    pub support_score: f64,
    pub synergy_score: f64,
    pub completeness_score: f64,
    pub win_condition_level: Option<u32>,
    pub win_condition_max_level: Option<u32>,
    pub owned_cards: usize,
    pub total_cards: usize,
    pub missing_cards: Vec<String>,
    pub underleveled_cards: Vec<UnderleveledCard>,
    pub top_synergies: Vec<SynergyPair>,
    pub average_elixir: f64,
    #[serde(default)]
    pub strategies: Vec<StrategyRecommendation>,
    #[serde(default)]
    pub upgrades: Vec<ArchetypeUpgrade>,
    pub gold_to_competitive: u64,
}

/// One card's effect across every archetype that uses it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardArchetypeImpact {
    pub card_name: String,
    pub current_level: u32,
    pub gold_cost: u64,
    pub affected_archetypes: Vec<String>,
    pub total_viability_gain: f64,
    pub archetypes_unlocked: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DynamicArchetypeAnalysis {
    pub player_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    pub analysis_time: DateTime<Utc>,
    pub template_fingerprint: String,
    pub archetypes: Vec<DetectedArchetype>,
    pub optimal: Vec<String>,
    pub competitive: Vec<String>,
    pub playable: Vec<String>,
    pub blocked: Vec<String>,
    pub top_upgrade_impacts: Vec<CardArchetypeImpact>,
    pub key_cards: Vec<CardArchetypeImpact>,
}

impl DynamicArchetypeAnalysis {
    pub fn by_tier(&self, tier: ViabilityTier) -> &[String] {
        match tier {
            ViabilityTier::Optimal => &self.optimal,
            ViabilityTier::Competitive => &self.competitive,
            ViabilityTier::Playable => &self.playable,
            ViabilityTier::Blocked => &self.blocked,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::viability::ViabilityTier;

    #[test]
    fn tiers_are_exhaustive_and_non_overlapping() {
        assert_eq!(ViabilityTier::from_score(100.0), ViabilityTier::Optimal);
        assert_eq!(ViabilityTier::from_score(90.0), ViabilityTier::Optimal);
        assert_eq!(ViabilityTier::from_score(89.999), ViabilityTier::Competitive);
        assert_eq!(ViabilityTier::from_score(75.0), ViabilityTier::Competitive);
        assert_eq!(ViabilityTier::from_score(74.999), ViabilityTier::Playable);
        assert_eq!(ViabilityTier::from_score(60.0), ViabilityTier::Playable);
        assert_eq!(ViabilityTier::from_score(59.999), ViabilityTier::Blocked);
        assert_eq!(ViabilityTier::from_score(0.0), ViabilityTier::Blocked);
    }

    #[test]
    fn tier_ordering_tracks_strength() {
        assert!(ViabilityTier::Optimal > ViabilityTier::Competitive);
        assert!(ViabilityTier::Playable > ViabilityTier::Blocked);
        for tier in ViabilityTier::ALL {
            assert_eq!(tier.as_slug().parse::<ViabilityTier>().ok(), Some(tier));
        }
    }
}
