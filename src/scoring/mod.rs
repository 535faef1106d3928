pub mod candidates;
pub mod roles;

use serde::{Deserialize, Serialize};

use crate::types::{CardLevelInfo, Rarity};

pub use roles::{Role, RoleClassifier};

const LEVEL_WEIGHT: f64 = 1.2;
const ELIXIR_WEIGHT: f64 = 0.15;
const ROLE_BONUS: f64 = 0.05;
const EVOLUTION_WEIGHT: f64 = 0.15;
const IDEAL_ELIXIR: f64 = 3.0;

pub fn rarity_boost(rarity: Rarity) -> f64 {
    match rarity {
        Rarity::Common => 1.0,
        Rarity::Rare => 1.05,
        Rarity::Epic => 1.1,
        Rarity::Legendary => 1.15,
        Rarity::Champion => 1.2,
    }
}

pub fn level_ratio(level: u32, max_level: u32) -> f64 {
    if max_level == 0 {
        return 0.0;
    }
    f64::from(level) / f64::from(max_level)
}

/// Peaks at 3 elixir and goes negative past 12; only the relative value matters.
pub fn elixir_weight(elixir_cost: u32) -> f64 {
    1.0 - (f64::from(elixir_cost) - IDEAL_ELIXIR).abs() / 9.0
}

pub fn score_card(level: u32, max_level: u32, rarity: Rarity, elixir_cost: u32, role: Role) -> f64 {
    let role_bonus = if role.is_assigned() { ROLE_BONUS } else { 0.0 };
    level_ratio(level, max_level) * LEVEL_WEIGHT * rarity_boost(rarity)
        + elixir_weight(elixir_cost) * ELIXIR_WEIGHT
        + role_bonus
}

pub fn score_card_with_evolution(
    level: u32,
    max_level: u32,
    rarity: Rarity,
    elixir_cost: u32,
    role: Role,
    evolution_level: u32,
    max_evolution_level: u32,
) -> f64 {
    score_card(level, max_level, rarity, elixir_cost, role)
        + evolution_bonus(evolution_level, max_evolution_level)
}

pub fn evolution_bonus(evolution_level: u32, max_evolution_level: u32) -> f64 {
    if max_evolution_level == 0 {
        return 0.0;
    }
    let ratio = f64::from(evolution_level) / f64::from(max_evolution_level);
    EVOLUTION_WEIGHT * ratio.min(1.0)
}

/// Evolution-aware score of an owned card as it would be at `level`.
pub fn score_owned_at(card: &CardLevelInfo, level: u32, role: Role) -> f64 {
    score_card_with_evolution(
        level,
        card.max_level,
        card.rarity,
        card.elixir_cost,
        role,
        card.evolution_level,
        card.max_evolution_level,
    )
}

pub fn score_owned(card: &CardLevelInfo, role: Role) -> f64 {
    score_owned_at(card, card.level, role)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardCandidate {
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    pub rarity: Rarity,
    pub elixir: u32,
    pub role: Role,
    pub score: f64,
    pub evolution_level: u32,
    pub max_evolution_level: u32,
}

impl CardCandidate {
    pub fn from_card(name: &str, card: &CardLevelInfo, classifier: &RoleClassifier) -> Self {
        let role = classifier.classify(name, card.elixir_cost);
        Self {
            name: name.to_string(),
            level: card.level,
            max_level: card.max_level,
            rarity: card.rarity,
            elixir: card.elixir_cost,
            role,
            score: score_owned(card, role),
            evolution_level: card.evolution_level,
            max_evolution_level: card.max_evolution_level,
        }
    }

    pub fn level_ratio(&self) -> f64 {
        level_ratio(self.level, self.max_level)
    }
}

#[cfg(test)]
mod tests {
    use crate::scoring::{
        elixir_weight, score_card, score_card_with_evolution, CardCandidate, Role, RoleClassifier,
    };
    use crate::types::{CardLevelInfo, Rarity};

    #[test]
    fn scoring_is_deterministic() {
        let a = score_card(11, 14, Rarity::Epic, 4, Role::Support);
        let b = score_card(11, 14, Rarity::Epic, 4, Role::Support);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn zero_max_level_contributes_nothing() {
        let score = score_card(0, 0, Rarity::Common, 3, Role::None);
        assert!(score.is_finite());
        assert!((score - 0.15).abs() < 1e-9);
    }

    #[test]
    fn formula_matches_weights() {
        let score = score_card(14, 14, Rarity::Champion, 3, Role::WinCondition);
        assert!((score - (1.2 * 1.2 + 0.15 + 0.05)).abs() < 1e-9);

        let heavy = score_card(7, 14, Rarity::Rare, 9, Role::None);
        let expected = 0.5 * 1.2 * 1.05 + (1.0 - 6.0 / 9.0) * 0.15;
        assert!((heavy - expected).abs() < 1e-9);
        assert!(elixir_weight(15) < 0.0);
    }

    #[test]
    fn score_is_monotonic_in_level() {
        for rarity in Rarity::ALL {
            let mut previous = f64::MIN;
            for level in 1..=16 {
                let score = score_card(level, 16, rarity, 4, Role::Cycle);
                assert!(score >= previous);
                previous = score;
            }
        }
    }

    #[test]
    fn evolution_bonus_is_capped() {
        let base = score_card(12, 14, Rarity::Common, 3, Role::Cycle);
        let evolved = score_card_with_evolution(12, 14, Rarity::Common, 3, Role::Cycle, 1, 1);
        let over = score_card_with_evolution(12, 14, Rarity::Common, 3, Role::Cycle, 3, 1);
        let none = score_card_with_evolution(12, 14, Rarity::Common, 3, Role::Cycle, 1, 0);
        assert!((evolved - base - 0.15).abs() < 1e-9);
        assert!((over - evolved).abs() < 1e-9);
        assert!((none - base).abs() < 1e-9);
    }

    #[test]
    fn candidate_carries_role_and_score() {
        let classifier = RoleClassifier::standard();
        let card = CardLevelInfo::new(13, 14, Rarity::Rare, 4);
        let candidate = CardCandidate::from_card("Hog Rider", &card, &classifier);
        assert_eq!(candidate.role, Role::WinCondition);
        let expected = score_card(13, 14, Rarity::Rare, 4, Role::WinCondition);
        assert!((candidate.score - expected).abs() < 1e-9);
    }
}
