use serde::{Deserialize, Serialize};

use crate::costs::UpgradeCostTable;
use crate::scoring::{score_card_with_evolution, CardCandidate, Role};
use crate::types::Rarity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeckUpgradeSuggestion {
    pub card_name: String,
    pub rarity: Rarity,
    pub current_level: u32,
    pub target_level: u32,
    pub score_delta: f64,
    pub impact_score: f64,
    pub gold_cost: u64,
    pub value_per_1k_gold: f64,
    pub reason: String,
}

fn role_importance(role: Role) -> f64 {
    match role {
        Role::WinCondition => 1.0,
        Role::Building => 0.7,
        Role::BigSpell => 0.6,
        Role::Support => 0.5,
        Role::SmallSpell => 0.4,
        Role::Cycle => 0.3,
        Role::None => 0.4,
    }
}

fn rarity_bonus(rarity: Rarity) -> f64 {
    match rarity {
        Rarity::Common => 1.0,
        Rarity::Rare => 1.3,
        Rarity::Epic => 1.7,
        Rarity::Legendary => 2.2,
        Rarity::Champion => 2.5,
    }
}

fn reason_for(delta: f64, card: &CardCandidate) -> String {
    let strength = if delta > 0.05 {
        "Significant"
    } else if delta > 0.02 {
        "Moderate"
    } else {
        "Minor"
    };
    format!(
        "{strength} power gain for a {} {}",
        card.rarity,
        card.role.to_string().to_ascii_lowercase()
    )
}

/// +1 level suggestions for the cards of a built deck, best impact first.
pub fn suggest_deck_upgrades(
    costs: &UpgradeCostTable,
    deck: &[CardCandidate],
) -> Vec<DeckUpgradeSuggestion> {
    let mut out: Vec<DeckUpgradeSuggestion> = deck
        .iter()
        .filter(|c| c.max_level > 0 && c.level < c.max_level)
        .map(|c| {
            let current = score_card_with_evolution(
                c.level,
                c.max_level,
                c.rarity,
                c.elixir,
                c.role,
                c.evolution_level,
                c.max_evolution_level,
            );
            let upgraded = score_card_with_evolution(
                c.level + 1,
                c.max_level,
                c.rarity,
                c.elixir,
                c.role,
                c.evolution_level,
                c.max_evolution_level,
            );
            let score_delta = upgraded - current;
            let impact_score = score_delta * 1000.0
                + role_importance(c.role) * 20.0
                + rarity_bonus(c.rarity) * 10.0;
            let gold_cost = costs.gold_for_upgrade(c.level, c.rarity);
            let value_per_1k_gold = if gold_cost > 0 {
                impact_score / gold_cost as f64 * 1000.0
            } else {
                0.0
            };
            DeckUpgradeSuggestion {
                card_name: c.name.clone(),
                rarity: c.rarity,
                current_level: c.level,
                target_level: c.level + 1,
                score_delta,
                impact_score,
                gold_cost,
                value_per_1k_gold,
                reason: reason_for(score_delta, c),
            }
        })
        .collect();

    out.sort_by(|a, b| {
        b.impact_score
            .total_cmp(&a.impact_score)
            .then_with(|| a.card_name.cmp(&b.card_name))
    });
    out
}
