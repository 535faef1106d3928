use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::error::AnalysisError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(from = "String", into = "String")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Champion,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Champion,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
            Self::Champion => "champion",
        }
    }

    /// Case-insensitive parse that treats anything unrecognized as Common.
    pub fn normalize(raw: &str) -> Self {
        raw.parse().unwrap_or(Self::Common)
    }
}

impl Display for Rarity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::Common => "Common",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
            Self::Champion => "Champion",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown rarity: {0}")]
pub struct RarityParseError(pub String);

impl FromStr for Rarity {
    type Err = RarityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "common" => Ok(Self::Common),
            "rare" => Ok(Self::Rare),
            "epic" => Ok(Self::Epic),
            "legendary" => Ok(Self::Legendary),
            "champion" => Ok(Self::Champion),
            _ => Err(RarityParseError(s.to_string())),
        }
    }
}

impl From<String> for Rarity {
    fn from(value: String) -> Self {
        Self::normalize(&value)
    }
}

impl From<Rarity> for String {
    fn from(value: Rarity) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardLevelInfo {
    pub level: u32,
    #[serde(default)]
    pub max_level: u32,
    #[serde(default = "default_rarity")]
    pub rarity: Rarity,
    #[serde(default)]
    pub elixir_cost: u32,
    #[serde(default, alias = "count")]
    pub owned_count: u32,
    #[serde(default)]
    pub evolution_level: u32,
    #[serde(default)]
    pub max_evolution_level: u32,
}

impl CardLevelInfo {
    pub fn new(level: u32, max_level: u32, rarity: Rarity, elixir_cost: u32) -> Self {
        Self {
            level,
            max_level,
            rarity,
            elixir_cost,
            owned_count: 0,
            evolution_level: 0,
            max_evolution_level: 0,
        }
    }

    pub fn with_owned(mut self, owned_count: u32) -> Self {
        self.owned_count = owned_count;
        self
    }

    pub fn with_evolution(mut self, evolution_level: u32, max_evolution_level: u32) -> Self {
        self.evolution_level = evolution_level;
        self.max_evolution_level = max_evolution_level;
        self
    }

    pub fn level_ratio(&self) -> f64 {
        if self.max_level == 0 {
            return 0.0;
        }
        f64::from(self.level) / f64::from(self.max_level)
    }

    pub fn is_max_level(&self) -> bool {
        self.max_level > 0 && self.level >= self.max_level
    }
}

fn default_rarity() -> Rarity {
    Rarity::Common
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionSnapshot {
    pub player_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default)]
    pub cards: BTreeMap<String, CardLevelInfo>,
}

impl CollectionSnapshot {
    pub fn new(player_tag: impl Into<String>) -> Self {
        Self {
            player_tag: player_tag.into(),
            player_name: None,
            cards: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = Some(name.into());
        self
    }

    pub fn with_card(mut self, name: impl Into<String>, info: CardLevelInfo) -> Self {
        self.cards.insert(name.into(), info);
        self
    }

    pub fn card(&self, name: &str) -> Option<&CardLevelInfo> {
        self.cards.get(name)
    }

    pub fn owns(&self, name: &str) -> bool {
        self.cards.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Copy of the snapshot with the named cards treated as unowned.
    pub fn without(&self, excluded: &[String]) -> Self {
        if excluded.is_empty() {
            return self.clone();
        }
        let excluded: BTreeSet<&str> = excluded.iter().map(String::as_str).collect();
        Self {
            player_tag: self.player_tag.clone(),
            player_name: self.player_name.clone(),
            cards: self
                .cards
                .iter()
                .filter(|(name, _)| !excluded.contains(name.as_str()))
                .map(|(name, info)| (name.clone(), info.clone()))
                .collect(),
        }
    }

    /// Entry checks shared by every analysis call. Levels outside the
    /// rarity's usual band are tolerated since older data uses a shorter scale.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.player_tag.trim().is_empty() {
            return Err(AnalysisError::InvalidInput(
                "player tag is empty".to_string(),
            ));
        }
        for (name, info) in &self.cards {
            if name.trim().is_empty() {
                return Err(AnalysisError::InvalidInput(
                    "card with empty name in collection".to_string(),
                ));
            }
            if info.level == 0 {
                return Err(AnalysisError::InvalidInput(format!(
                    "card {name} has level 0"
                )));
            }
            if info.max_level > 0 && info.level > info.max_level {
                warn!(
                    card = name.as_str(),
                    level = info.level,
                    max_level = info.max_level,
                    "card level exceeds its max level"
                );
            }
        }
        Ok(())
    }
}
