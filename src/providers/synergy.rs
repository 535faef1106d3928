use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const BUNDLED_PAIRS: &str = include_str!("synergy_pairs.json");

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SynergyCategory {
    TankSupport,
    Bait,
    SpellCombo,
    WinCondition,
    Defensive,
    Cycle,
    BridgeSpam,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynergyPair {
    pub card1: String,
    pub card2: String,
    pub synergy_type: SynergyCategory,
    pub score: f64,
    #[serde(default)]
    pub description: String,
}

/// Pairwise card affinity in [0, 1]; 0 means no known synergy.
pub trait SynergyDb: Send + Sync {
    fn synergy(&self, a: &str, b: &str) -> f64;
    fn synergy_pair(&self, a: &str, b: &str) -> Option<SynergyPair>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SynergyDocument {
    pairs: Vec<SynergyPair>,
}

/// Symmetric in-memory synergy lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynergyTable {
    pairs: BTreeMap<(String, String), SynergyPair>,
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl SynergyTable {
    pub fn new(pairs: Vec<SynergyPair>) -> Self {
        let pairs = pairs
            .into_iter()
            .map(|mut pair| {
                pair.score = pair.score.clamp(0.0, 1.0);
                (pair_key(&pair.card1, &pair.card2), pair)
            })
            .collect();
        Self { pairs }
    }

    pub fn bundled() -> Result<Self, serde_json::Error> {
        Self::from_json(BUNDLED_PAIRS)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let document: SynergyDocument = serde_json::from_str(raw)?;
        Ok(Self::new(document.pairs))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = &SynergyPair> {
        self.pairs.values()
    }
}

impl SynergyDb for SynergyTable {
    fn synergy(&self, a: &str, b: &str) -> f64 {
        self.pairs
            .get(&pair_key(a, b))
            .map(|pair| pair.score)
            .unwrap_or(0.0)
    }

    fn synergy_pair(&self, a: &str, b: &str) -> Option<SynergyPair> {
        self.pairs.get(&pair_key(a, b)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use crate::providers::synergy::{SynergyCategory, SynergyDb, SynergyPair, SynergyTable};

    #[test]
    fn lookup_is_symmetric() {
        let table = SynergyTable::new(vec![SynergyPair {
            card1: "Golem".to_string(),
            card2: "Night Witch".to_string(),
            synergy_type: SynergyCategory::TankSupport,
            score: 0.95,
            description: String::new(),
        }]);
        assert!((table.synergy("Golem", "Night Witch") - 0.95).abs() < 1e-9);
        assert!((table.synergy("Night Witch", "Golem") - 0.95).abs() < 1e-9);
        assert_eq!(table.synergy("Golem", "Zap"), 0.0);
        assert!(table.synergy_pair("Night Witch", "Golem").is_some());
    }

    #[test]
    fn bundled_pairs_load() {
        let table = SynergyTable::bundled().expect("bundled synergy should parse");
        assert!(table.len() > 100);
        assert!(table.synergy("Lava Hound", "Balloon") > 0.9);
        assert!(table.pairs().all(|p| (0.0..=1.0).contains(&p.score)));
    }
}
