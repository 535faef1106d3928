use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Balanced,
    Aggro,
    Control,
    Cycle,
    Splash,
    Spell,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::Balanced,
        Strategy::Aggro,
        Strategy::Control,
        Strategy::Cycle,
        Strategy::Splash,
        Strategy::Spell,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Aggro => "aggro",
            Self::Control => "control",
            Self::Cycle => "cycle",
            Self::Splash => "splash",
            Self::Spell => "spell",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown strategy: {0}")]
pub struct StrategyParseError(pub String);

impl FromStr for Strategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(Self::Balanced),
            "aggro" | "aggressive" | "beatdown" => Ok(Self::Aggro),
            "control" => Ok(Self::Control),
            "cycle" => Ok(Self::Cycle),
            "splash" => Ok(Self::Splash),
            "spell" | "bait" => Ok(Self::Spell),
            _ => Err(StrategyParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyProfile {
    pub target_elixir_min: f64,
    pub target_elixir_max: f64,
    /// Card name → affinity in [0, 1].
    #[serde(default)]
    pub archetype_affinity: BTreeMap<String, f64>,
}

impl StrategyProfile {
    pub fn new(target_elixir_min: f64, target_elixir_max: f64) -> Self {
        Self {
            target_elixir_min,
            target_elixir_max,
            archetype_affinity: BTreeMap::new(),
        }
    }

    pub fn with_affinity(mut self, entries: &[(&str, f64)]) -> Self {
        self.archetype_affinity
            .extend(entries.iter().map(|(name, value)| (name.to_string(), *value)));
        self
    }
}

pub trait StrategyProvider: Send + Sync {
    fn strategies(&self) -> Vec<Strategy>;
    fn profile(&self, strategy: Strategy) -> Option<StrategyProfile>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinStrategies {
    profiles: BTreeMap<Strategy, StrategyProfile>,
}

impl Default for BuiltinStrategies {
    fn default() -> Self {
        Self::standard()
    }
}

impl BuiltinStrategies {
    pub fn empty() -> Self {
        Self {
            profiles: BTreeMap::new(),
        }
    }

    pub fn standard() -> Self {
        Self::empty()
            .with_profile(
                Strategy::Balanced,
                StrategyProfile::new(3.0, 3.8).with_affinity(&[
                    ("Hog Rider", 0.7),
                    ("Giant", 0.7),
                    ("Royal Giant", 0.7),
                    ("Miner", 0.6),
                    ("Three Musketeers", 0.6),
                    ("Royal Hogs", 0.6),
                    ("Golden Knight", 0.6),
                    ("Royal Recruits", 0.6),
                    ("Musketeer", 0.7),
                    ("Valkyrie", 0.7),
                    ("Knight", 0.6),
                    ("Fireball", 0.6),
                ]),
            )
            .with_profile(
                Strategy::Aggro,
                StrategyProfile::new(3.5, 4.0).with_affinity(&[
                    ("Golem", 0.9),
                    ("Lava Hound", 0.9),
                    ("Electro Giant", 0.9),
                    ("Giant", 0.85),
                    ("Balloon", 0.8),
                    ("P.E.K.K.A", 0.8),
                    ("Mega Knight", 0.8),
                    ("Battle Ram", 0.8),
                    ("Night Witch", 0.8),
                    ("Lumberjack", 0.8),
                    ("Wall Breakers", 0.8),
                    ("Bandit", 0.75),
                    ("Royal Ghost", 0.75),
                    ("Prince", 0.75),
                    ("Elixir Collector", 0.7),
                ]),
            )
            .with_profile(
                Strategy::Control,
                StrategyProfile::new(3.5, 4.2).with_affinity(&[
                    ("X-Bow", 0.9),
                    ("Mortar", 0.9),
                    ("Graveyard", 0.9),
                    ("Poison", 0.8),
                    ("Tornado", 0.8),
                    ("Ice Wizard", 0.8),
                    ("Bomb Tower", 0.8),
                    ("Tesla", 0.8),
                    ("Baby Dragon", 0.7),
                    ("Bowler", 0.7),
                    ("Cannon Cart", 0.7),
                    ("Skeleton King", 0.7),
                ]),
            )
            .with_profile(
                Strategy::Cycle,
                StrategyProfile::new(2.5, 3.0).with_affinity(&[
                    ("Hog Rider", 0.9),
                    ("Miner", 0.85),
                    ("Royal Hogs", 0.8),
                    ("Goblin Drill", 0.8),
                    ("Royal Giant", 0.7),
                    ("Skeletons", 0.9),
                    ("Ice Spirit", 0.9),
                    ("Ice Golem", 0.85),
                    ("Electro Spirit", 0.8),
                    ("Cannon", 0.8),
                    ("Bats", 0.75),
                    ("Knight", 0.7),
                    ("Spear Goblins", 0.7),
                ]),
            )
            .with_profile(
                Strategy::Splash,
                StrategyProfile::new(3.2, 3.8).with_affinity(&[
                    ("Valkyrie", 0.85),
                    ("Baby Dragon", 0.85),
                    ("Wizard", 0.85),
                    ("Witch", 0.85),
                    ("Executioner", 0.85),
                    ("Bowler", 0.8),
                    ("Magic Archer", 0.8),
                    ("Giant", 0.7),
                    ("Royal Hogs", 0.7),
                    ("Fireball", 0.7),
                    ("Flying Machine", 0.6),
                ]),
            )
            .with_profile(
                Strategy::Spell,
                StrategyProfile::new(3.0, 3.8).with_affinity(&[
                    ("Goblin Barrel", 0.9),
                    ("Rocket", 0.9),
                    ("Princess", 0.85),
                    ("Goblin Gang", 0.85),
                    ("Dart Goblin", 0.8),
                    ("Log", 0.8),
                    ("Poison", 0.8),
                    ("Fireball", 0.8),
                    ("Inferno Tower", 0.75),
                    ("Knight", 0.7),
                    ("Ice Spirit", 0.7),
                    ("Miner", 0.7),
                ]),
            )
    }

    pub fn with_profile(mut self, strategy: Strategy, profile: StrategyProfile) -> Self {
        self.profiles.insert(strategy, profile);
        self
    }
}

impl StrategyProvider for BuiltinStrategies {
    fn strategies(&self) -> Vec<Strategy> {
        self.profiles.keys().copied().collect()
    }

    fn profile(&self, strategy: Strategy) -> Option<StrategyProfile> {
        self.profiles.get(&strategy).cloned()
    }
}

#[cfg(test)]
mod tests {
    use crate::providers::strategy::{BuiltinStrategies, Strategy, StrategyProvider};

    #[test]
    fn builtin_profiles_cover_every_strategy() {
        let provider = BuiltinStrategies::standard();
        assert_eq!(provider.strategies(), Strategy::ALL.to_vec());
        let cycle = provider.profile(Strategy::Cycle).expect("cycle profile");
        assert!((cycle.target_elixir_min - 2.5).abs() < 1e-9);
        assert!((cycle.target_elixir_max - 3.0).abs() < 1e-9);
        assert!(cycle.archetype_affinity.contains_key("Hog Rider"));
    }

    #[test]
    fn strategy_parsing_accepts_aliases() {
        assert_eq!("Beatdown".parse::<Strategy>().ok(), Some(Strategy::Aggro));
        assert_eq!("spell".parse::<Strategy>().ok(), Some(Strategy::Spell));
        assert!("turtle".parse::<Strategy>().is_err());
    }
}
