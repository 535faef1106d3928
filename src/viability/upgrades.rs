use std::collections::BTreeMap;

use crate::archetype::{ArchetypeTemplate, TemplateSlot};
use crate::costs::UpgradeCostTable;
use crate::types::CollectionSnapshot;
use crate::viability::{ArchetypeUpgrade, CardArchetypeImpact, UpgradeUrgency, ViabilityTier};

/// Heuristic viability points gained from one more level, boosted when the
/// archetype sits just under a tier boundary.
pub fn estimate_viability_gain(level: u32, max_level: u32, viability: f64) -> f64 {
    if max_level == 0 || level >= max_level {
        return 0.0;
    }
    let base = 10.0 * f64::from(max_level - level) / f64::from(max_level);
    let boost = if (58.0..60.0).contains(&viability) || (73.0..75.0).contains(&viability) {
        1.5
    } else if (88.0..90.0).contains(&viability) {
        1.3
    } else {
        1.0
    };
    base * boost
}

pub fn urgency(gain: f64, is_win_condition: bool) -> UpgradeUrgency {
    if is_win_condition {
        if gain >= 8.0 {
            UpgradeUrgency::Critical
        } else if gain >= 5.0 {
            UpgradeUrgency::High
        } else {
            UpgradeUrgency::Medium
        }
    } else if gain >= 10.0 {
        UpgradeUrgency::Critical
    } else if gain >= 7.0 {
        UpgradeUrgency::High
    } else if gain >= 4.0 {
        UpgradeUrgency::Medium
    } else {
        UpgradeUrgency::Low
    }
}

/// Every owned, non-maxed card of the template, best gain first.
pub fn archetype_upgrades(
    costs: &UpgradeCostTable,
    template: &ArchetypeTemplate,
    snapshot: &CollectionSnapshot,
    viability: f64,
) -> Vec<ArchetypeUpgrade> {
    let mut out: Vec<ArchetypeUpgrade> = template
        .all_cards()
        .into_iter()
        .filter_map(|name| {
            let card = snapshot.card(name)?;
            let max_level = costs.card_max_level(card);
            if card.level >= max_level {
                return None;
            }
            let is_win_condition = template.slot_of(name) == Some(TemplateSlot::WinCondition);
            let viability_gain = estimate_viability_gain(card.level, max_level, viability);
            Some(ArchetypeUpgrade {
                card_name: name.to_string(),
                current_level: card.level,
                target_level: card.level + 1,
                max_level,
                viability_gain,
                gold_cost: costs.estimate_gold(card.level, card.rarity),
                priority: urgency(viability_gain, is_win_condition),
                is_win_condition,
            })
        })
        .collect();

    out.sort_by(|a, b| {
        b.viability_gain
            .total_cmp(&a.viability_gain)
            .then_with(|| b.is_win_condition.cmp(&a.is_win_condition))
            .then_with(|| a.card_name.cmp(&b.card_name))
    });
    out
}

/// Gold for the critical/high upgrades of an archetype still below competitive.
pub fn gold_to_competitive(tier: ViabilityTier, upgrades: &[ArchetypeUpgrade]) -> u64 {
    if tier >= ViabilityTier::Competitive {
        return 0;
    }
    upgrades
        .iter()
        .filter(|u| matches!(u.priority, UpgradeUrgency::Critical | UpgradeUrgency::High))
        .map(|u| u.gold_cost)
        .sum()
}

/// Aggregates each owned card's estimated gain over every archetype using it.
/// Sorted by total gain, best first.
pub fn cross_archetype_impacts(
    costs: &UpgradeCostTable,
    evaluated: &[(&ArchetypeTemplate, f64)],
    snapshot: &CollectionSnapshot,
) -> Vec<CardArchetypeImpact> {
    let mut by_card: BTreeMap<&str, CardArchetypeImpact> = BTreeMap::new();
    for (template, viability) in evaluated {
        let current_tier = ViabilityTier::from_score(*viability);
        for name in template.all_cards() {
            let Some(card) = snapshot.card(name) else {
                continue;
            };
            let max_level = costs.card_max_level(card);
            if card.level >= max_level {
                continue;
            }
            let gain = estimate_viability_gain(card.level, max_level, *viability);
            let entry = by_card.entry(name).or_insert_with(|| CardArchetypeImpact {
                card_name: name.to_string(),
                current_level: card.level,
                gold_cost: costs.estimate_gold(card.level, card.rarity),
                affected_archetypes: Vec::new(),
                total_viability_gain: 0.0,
                archetypes_unlocked: 0,
            });
            entry.affected_archetypes.push(template.name.clone());
            entry.total_viability_gain += gain;
            if ViabilityTier::from_score((viability + gain).min(100.0)) > current_tier {
                entry.archetypes_unlocked += 1;
            }
        }
    }

    let mut out: Vec<CardArchetypeImpact> = by_card.into_values().collect();
    out.sort_by(|a, b| {
        b.total_viability_gain
            .total_cmp(&a.total_viability_gain)
            .then_with(|| a.card_name.cmp(&b.card_name))
    });
    out
}

/// Cards whose single upgrade lifts two or more archetypes into a higher tier.
pub fn key_cards(impacts: &[CardArchetypeImpact]) -> Vec<CardArchetypeImpact> {
    let mut out: Vec<CardArchetypeImpact> = impacts
        .iter()
        .filter(|impact| impact.archetypes_unlocked >= 2)
        .cloned()
        .collect();
    out.sort_by(|a, b| {
        b.archetypes_unlocked
            .cmp(&a.archetypes_unlocked)
            .then_with(|| b.total_viability_gain.total_cmp(&a.total_viability_gain))
            .then_with(|| a.card_name.cmp(&b.card_name))
    });
    out
}
