use crate::impact::{UnlockNode, UnlockStatus, UpgradeImpactAnalyzer};
use crate::types::CollectionSnapshot;

/// Deltas at or below this are treated as noise.
const NOISE_FLOOR: f64 = 0.01;
const BLOCKED_BELOW: f64 = 0.5;
const MAX_UPGRADES_LISTED: usize = 3;

struct Candidate<'a> {
    name: &'a str,
    delta: f64,
    gold: u64,
}

/// One node per template, in template order.
pub fn build_unlock_tree(
    analyzer: &UpgradeImpactAnalyzer,
    snapshot: &CollectionSnapshot,
    viability_threshold: f64,
) -> Vec<UnlockNode> {
    let costs = analyzer.costs();
    analyzer
        .templates()
        .templates()
        .iter()
        .map(|template| {
            if !snapshot.owns(&template.win_condition) {
                return UnlockNode {
                    archetype: template.name.clone(),
                    status: UnlockStatus::Blocked,
                    current_score: analyzer.composite_score(template, snapshot),
                    upgrades_needed: vec![format!("{} (not owned)", template.win_condition)],
                    priority_upgrade: Some(template.win_condition.clone()),
                    estimated_gold: 0,
                };
            }

            let current_score = analyzer.composite_score(template, snapshot);
            let status = if current_score < BLOCKED_BELOW {
                UnlockStatus::Blocked
            } else if current_score < viability_threshold {
                UnlockStatus::Marginal
            } else {
                UnlockStatus::Viable
            };

            let names =
                std::iter::once(&template.win_condition).chain(template.support_cards.iter());
            let mut candidates: Vec<Candidate> = Vec::new();
            for name in names {
                let Some(card) = snapshot.card(name) else {
                    continue;
                };
                if card.level >= costs.card_max_level(card)
                    || candidates.iter().any(|c| c.name == name.as_str())
                {
                    continue;
                }
                let projected =
                    analyzer.composite_with_upgrade(template, snapshot, name, card.level + 1);
                candidates.push(Candidate {
                    name,
                    delta: projected - current_score,
                    gold: costs.gold_for_upgrade(card.level, card.rarity),
                });
            }

            let mut flagged: Vec<Candidate> = candidates
                .into_iter()
                .filter(|c| c.delta > NOISE_FLOOR)
                .collect();
            flagged.sort_by(|a, b| b.delta.total_cmp(&a.delta));
            flagged.truncate(MAX_UPGRADES_LISTED);

            UnlockNode {
                archetype: template.name.clone(),
                status,
                current_score,
                upgrades_needed: flagged.iter().map(|c| c.name.to_string()).collect(),
                priority_upgrade: flagged.first().map(|c| c.name.to_string()),
                estimated_gold: flagged.iter().map(|c| c.gold).sum(),
            }
        })
        .collect()
}
