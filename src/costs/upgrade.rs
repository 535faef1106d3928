use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::costs::UpgradeCostTable;
use crate::types::{CardLevelInfo, CollectionSnapshot, Rarity};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpgradeInfo {
    pub card_name: String,
    pub rarity: Rarity,
    pub elixir_cost: u32,
    pub current_level: u32,
    pub max_level: u32,
    pub evolution_level: u32,
    pub max_evolution_level: u32,
    pub is_max_level: bool,
    pub cards_owned: u32,
    pub cards_to_next_level: u32,
    pub cards_remaining: u32,
    pub progress_percent: f64,
    pub can_upgrade_now: bool,
    pub total_cards_to_max: u32,
    pub levels_to_max: u32,
    pub gold_to_next_level: u64,
}

impl UpgradeInfo {
    pub fn level_ratio(&self) -> f64 {
        if self.max_level == 0 {
            return 0.0;
        }
        f64::from(self.current_level) / f64::from(self.max_level)
    }
}

pub fn upgrade_info(table: &UpgradeCostTable, name: &str, card: &CardLevelInfo) -> UpgradeInfo {
    let max_level = table.card_max_level(card);
    let is_max_level = card.level >= max_level;
    let cards_to_next_level = if is_max_level {
        0
    } else {
        table.cards_needed_below(card.level, card.rarity, max_level)
    };
    let progress_percent = if cards_to_next_level == 0 {
        100.0
    } else {
        (f64::from(card.owned_count) / f64::from(cards_to_next_level) * 100.0).min(100.0)
    };

    UpgradeInfo {
        card_name: name.to_string(),
        rarity: card.rarity,
        elixir_cost: card.elixir_cost,
        current_level: card.level,
        max_level,
        evolution_level: card.evolution_level,
        max_evolution_level: card.max_evolution_level,
        is_max_level,
        cards_owned: card.owned_count,
        cards_to_next_level,
        cards_remaining: cards_to_next_level.saturating_sub(card.owned_count),
        progress_percent,
        can_upgrade_now: cards_to_next_level > 0
            && card.owned_count >= cards_to_next_level
            && !is_max_level,
        total_cards_to_max: if is_max_level {
            0
        } else {
            table.total_cards_below(card.level, card.rarity, max_level)
        },
        levels_to_max: max_level.saturating_sub(card.level),
        gold_to_next_level: if is_max_level {
            0
        } else {
            table.gold_for_upgrade(card.level, card.rarity)
        },
    }
}

pub fn collection_upgrade_info(
    table: &UpgradeCostTable,
    snapshot: &CollectionSnapshot,
) -> Vec<UpgradeInfo> {
    snapshot
        .cards
        .iter()
        .map(|(name, card)| upgrade_info(table, name, card))
        .collect()
}

fn rarity_priority_score(rarity: Rarity) -> f64 {
    match rarity {
        Rarity::Common => 0.0,
        Rarity::Rare => 20.0,
        Rarity::Epic => 40.0,
        Rarity::Legendary => 60.0,
        Rarity::Champion => 80.0,
    }
}

/// 0..100 urgency for upgrading a card; max-level cards always score 0.
pub fn calculate_priority_score(info: &UpgradeInfo) -> f64 {
    if info.is_max_level {
        return 0.0;
    }
    let level_ratio = info.level_ratio();
    let mut score = info.progress_percent * 0.5
        + level_ratio * 100.0 * 0.3
        + rarity_priority_score(info.rarity) * 0.2;

    if info.max_evolution_level > 0 {
        score += 10.0 + level_ratio * 20.0;
        if info.evolution_level > 0 {
            score += f64::from(info.evolution_level) / f64::from(info.max_evolution_level) * 5.0;
        }
    }
    if info.can_upgrade_now {
        score *= 1.2;
    }
    score.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            Self::High
        } else if score >= 40.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpgradePriority {
    pub info: UpgradeInfo,
    pub score: f64,
    pub priority: PriorityLevel,
    pub reasons: Vec<String>,
}

/// Cards worth upgrading, best first. `top_n == 0` keeps every match.
pub fn get_upgrade_priorities(
    infos: &[UpgradeInfo],
    min_score: f64,
    top_n: usize,
) -> Vec<UpgradePriority> {
    let mut out: Vec<UpgradePriority> = infos
        .iter()
        .filter(|info| !info.is_max_level)
        .filter_map(|info| {
            let score = calculate_priority_score(info);
            if score < min_score {
                return None;
            }
            Some(UpgradePriority {
                info: info.clone(),
                score,
                priority: PriorityLevel::from_score(score),
                reasons: priority_reasons(info),
            })
        })
        .collect();

    out.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.info.card_name.cmp(&b.info.card_name))
    });
    if top_n > 0 {
        out.truncate(top_n);
    }
    out
}

fn priority_reasons(info: &UpgradeInfo) -> Vec<String> {
    let mut reasons = Vec::new();
    if info.can_upgrade_now {
        reasons.push("Ready to upgrade now".to_string());
    } else if info.cards_to_next_level > 0 {
        reasons.push(format!(
            "{} more cards to level {} ({:.0}% collected)",
            info.cards_remaining,
            info.current_level + 1,
            info.progress_percent
        ));
    }
    if info.max_evolution_level > 0 {
        reasons.push("Evolution-capable card".to_string());
    }
    if info.level_ratio() >= 0.85 {
        reasons.push("Close to max level".to_string());
    }
    if matches!(info.rarity, Rarity::Legendary | Rarity::Champion) {
        reasons.push(format!("{} cards are scarce", info.rarity));
    }
    reasons
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RarityBreakdown {
    pub rarity: Rarity,
    pub total_cards: usize,
    pub max_level_cards: usize,
    pub upgradable_now: usize,
    pub average_level: f64,
    pub cards_to_max: u64,
}

pub fn rarity_breakdown(infos: &[UpgradeInfo]) -> Vec<RarityBreakdown> {
    let mut grouped: BTreeMap<Rarity, Vec<&UpgradeInfo>> = BTreeMap::new();
    for info in infos {
        grouped.entry(info.rarity).or_default().push(info);
    }
    grouped
        .into_iter()
        .map(|(rarity, cards)| {
            let total_levels: u64 = cards.iter().map(|c| u64::from(c.current_level)).sum();
            RarityBreakdown {
                rarity,
                total_cards: cards.len(),
                max_level_cards: cards.iter().filter(|c| c.is_max_level).count(),
                upgradable_now: cards.iter().filter(|c| c.can_upgrade_now).count(),
                average_level: total_levels as f64 / cards.len() as f64,
                cards_to_max: cards.iter().map(|c| u64::from(c.total_cards_to_max)).sum(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::costs::upgrade::{
        calculate_priority_score, get_upgrade_priorities, rarity_breakdown, upgrade_info,
        PriorityLevel,
    };
    use crate::costs::UpgradeCostTable;
    use crate::types::{CardLevelInfo, Rarity};

    #[test]
    fn common_card_halfway_to_next_level() {
        let table = UpgradeCostTable::standard();
        let card = CardLevelInfo::new(10, 14, Rarity::Common, 3).with_owned(500);
        let info = upgrade_info(&table, "Knight", &card);
        assert_eq!(info.cards_to_next_level, 1_000);
        assert_eq!(info.cards_remaining, 500);
        assert!((info.progress_percent - 50.0).abs() < 1e-9);
        assert!(!info.can_upgrade_now);
        assert_eq!(info.levels_to_max, 4);
        assert_eq!(info.total_cards_to_max, 1_000 + 2_000 + 3_000 + 2_500);
    }

    #[test]
    fn max_level_card_has_no_priority() {
        let table = UpgradeCostTable::standard();
        let card = CardLevelInfo::new(14, 14, Rarity::Legendary, 4)
            .with_owned(9_999)
            .with_evolution(1, 1);
        let info = upgrade_info(&table, "Miner", &card);
        assert!(info.is_max_level);
        assert_eq!(info.cards_to_next_level, 0);
        assert_eq!(info.total_cards_to_max, 0);
        assert!((info.progress_percent - 100.0).abs() < 1e-9);
        assert_eq!(calculate_priority_score(&info), 0.0);
    }

    #[test]
    fn priority_score_is_boosted_and_clamped() {
        let table = UpgradeCostTable::standard();
        let ready = CardLevelInfo::new(13, 14, Rarity::Champion, 4)
            .with_owned(50)
            .with_evolution(1, 1);
        let info = upgrade_info(&table, "Skeleton King", &ready);
        assert!(info.can_upgrade_now);
        assert!((calculate_priority_score(&info) - 100.0).abs() < 1e-9);

        let plain = CardLevelInfo::new(10, 14, Rarity::Common, 3).with_owned(500);
        let info = upgrade_info(&table, "Knight", &plain);
        let expected = 50.0 * 0.5 + (10.0 / 14.0) * 100.0 * 0.3;
        assert!((calculate_priority_score(&info) - expected).abs() < 1e-9);
    }

    #[test]
    fn priorities_are_filtered_sorted_and_limited() {
        let table = UpgradeCostTable::standard();
        let infos = vec![
            upgrade_info(
                &table,
                "Knight",
                &CardLevelInfo::new(10, 14, Rarity::Common, 3).with_owned(1_200),
            ),
            upgrade_info(
                &table,
                "Zap",
                &CardLevelInfo::new(14, 14, Rarity::Common, 2).with_owned(5_000),
            ),
            upgrade_info(
                &table,
                "Miner",
                &CardLevelInfo::new(12, 14, Rarity::Legendary, 3).with_owned(4),
            ),
            upgrade_info(
                &table,
                "Arrows",
                &CardLevelInfo::new(5, 14, Rarity::Common, 3).with_owned(0),
            ),
        ];
        let priorities = get_upgrade_priorities(&infos, 20.0, 2);
        assert!(priorities.len() <= 2);
        assert!(priorities.iter().all(|p| p.score >= 20.0));
        assert!(priorities.iter().all(|p| !p.info.is_max_level));
        assert!(priorities.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(priorities[0].info.card_name, "Knight");
        assert_eq!(priorities[0].priority, PriorityLevel::High);

        let everything = get_upgrade_priorities(&infos, 0.0, 0);
        assert_eq!(everything.len(), 3);
    }

    #[test]
    fn breakdown_groups_by_rarity() {
        let table = UpgradeCostTable::standard();
        let infos = vec![
            upgrade_info(&table, "Knight", &CardLevelInfo::new(12, 14, Rarity::Common, 3)),
            upgrade_info(&table, "Zap", &CardLevelInfo::new(14, 14, Rarity::Common, 2)),
            upgrade_info(&table, "Miner", &CardLevelInfo::new(11, 14, Rarity::Legendary, 3)),
        ];
        let breakdown = rarity_breakdown(&infos);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].rarity, Rarity::Common);
        assert_eq!(breakdown[0].total_cards, 2);
        assert_eq!(breakdown[0].max_level_cards, 1);
        assert!((breakdown[0].average_level - 13.0).abs() < 1e-9);
    }
}
