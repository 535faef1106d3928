pub mod upgrade;

use std::collections::BTreeMap;

use crate::types::{CardLevelInfo, Rarity};

pub use upgrade::{
    calculate_priority_score, collection_upgrade_info, get_upgrade_priorities, rarity_breakdown,
    upgrade_info, PriorityLevel, RarityBreakdown, UpgradeInfo, UpgradePriority,
};

pub const MAX_CARD_LEVEL: u32 = 16;
pub const GOLD_PER_GEM: u64 = 17;

/// Cards charged for a level that sits below max but has no explicit entry.
const MISSING_ENTRY_CARDS: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct RarityCosts {
    pub starting_level: u32,
    pub max_level: u32,
    pub cards: BTreeMap<u32, u32>,
    pub gold: BTreeMap<u32, u64>,
}

impl RarityCosts {
    pub fn new(starting_level: u32, max_level: u32) -> Self {
        Self {
            starting_level,
            max_level,
            cards: BTreeMap::new(),
            gold: BTreeMap::new(),
        }
    }

    pub fn with_cards(mut self, entries: &[(u32, u32)]) -> Self {
        self.cards.extend(entries.iter().copied());
        self
    }

    pub fn with_gold(mut self, entries: &[(u32, u64)]) -> Self {
        self.gold.extend(entries.iter().copied());
        self
    }
}

/// Immutable rarity/level lookup for card-count and gold upgrade costs.
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeCostTable {
    common: RarityCosts,
    rare: RarityCosts,
    epic: RarityCosts,
    legendary: RarityCosts,
    champion: RarityCosts,
}

impl Default for UpgradeCostTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl UpgradeCostTable {
    pub fn standard() -> Self {
        let late_gold: [(u32, u64); 7] = [
            (7, 2_000),
            (8, 4_000),
            (9, 8_000),
            (10, 20_000),
            (11, 50_000),
            (12, 100_000),
            (13, 100_000),
        ];

        let common = RarityCosts::new(1, MAX_CARD_LEVEL)
            .with_cards(&[
                (1, 2),
                (2, 4),
                (3, 10),
                (4, 20),
                (5, 50),
                (6, 100),
                (7, 200),
                (8, 400),
                (9, 800),
                (10, 1_000),
                (11, 2_000),
                (12, 3_000),
                (13, 2_500),
                (14, 3_500),
                (15, 5_500),
            ])
            .with_gold(&[(1, 5), (2, 20), (3, 50), (4, 150), (5, 400), (6, 1_000)])
            .with_gold(&late_gold);

        let rare = RarityCosts::new(3, MAX_CARD_LEVEL)
            .with_cards(&[
                (1, 2),
                (2, 2),
                (3, 2),
                (4, 4),
                (5, 10),
                (6, 20),
                (7, 50),
                (8, 100),
                (9, 200),
                (10, 300),
                (11, 400),
                (12, 400),
                (13, 550),
                (14, 750),
                (15, 1_000),
            ])
            .with_gold(&[(3, 50), (4, 150), (5, 400), (6, 1_000)])
            .with_gold(&late_gold);

        let epic = RarityCosts::new(6, MAX_CARD_LEVEL)
            .with_cards(&[
                (1, 2),
                (2, 2),
                (3, 2),
                (4, 2),
                (5, 2),
                (6, 2),
                (7, 4),
                (8, 10),
                (9, 20),
                (10, 50),
                (11, 30),
                (12, 40),
                (13, 70),
                (14, 100),
                (15, 140),
            ])
            .with_gold(&[(6, 400)])
            .with_gold(&late_gold);

        let legendary = RarityCosts::new(9, MAX_CARD_LEVEL)
            .with_cards(&[
                (1, 2),
                (2, 2),
                (3, 2),
                (4, 2),
                (5, 2),
                (6, 2),
                (7, 2),
                (8, 2),
                (9, 2),
                (10, 4),
                (11, 10),
                (12, 20),
                (13, 10),
                (14, 12),
                (15, 15),
            ])
            .with_gold(&[
                (9, 5_000),
                (10, 20_000),
                (11, 50_000),
                (12, 100_000),
                (13, 100_000),
            ]);

        let champion = RarityCosts::new(11, MAX_CARD_LEVEL)
            .with_cards(&[(1, 2), (11, 2), (12, 4), (13, 8), (14, 10), (15, 12)])
            .with_gold(&[(11, 50_000), (12, 100_000), (13, 100_000)]);

        Self {
            common,
            rare,
            epic,
            legendary,
            champion,
        }
    }

    pub fn with_rarity(mut self, rarity: Rarity, costs: RarityCosts) -> Self {
        *self.costs_mut(rarity) = costs;
        self
    }

    pub fn costs(&self, rarity: Rarity) -> &RarityCosts {
        match rarity {
            Rarity::Common => &self.common,
            Rarity::Rare => &self.rare,
            Rarity::Epic => &self.epic,
            Rarity::Legendary => &self.legendary,
            Rarity::Champion => &self.champion,
        }
    }

    fn costs_mut(&mut self, rarity: Rarity) -> &mut RarityCosts {
        match rarity {
            Rarity::Common => &mut self.common,
            Rarity::Rare => &mut self.rare,
            Rarity::Epic => &mut self.epic,
            Rarity::Legendary => &mut self.legendary,
            Rarity::Champion => &mut self.champion,
        }
    }

    pub fn max_level(&self, rarity: Rarity) -> u32 {
        self.costs(rarity).max_level
    }

    /// The card's own max level when the snapshot carries one, else the rarity cap.
    pub fn card_max_level(&self, card: &CardLevelInfo) -> u32 {
        if card.max_level > 0 {
            card.max_level
        } else {
            self.max_level(card.rarity)
        }
    }

    pub fn starting_level(&self, rarity: Rarity) -> u32 {
        self.costs(rarity).starting_level
    }

    pub fn is_max_level(&self, level: u32, rarity: Rarity) -> bool {
        level >= self.max_level(rarity)
    }

    pub fn cards_needed(&self, level: u32, rarity: Rarity) -> u32 {
        self.cards_needed_below(level, rarity, self.max_level(rarity))
    }

    /// Same as `cards_needed` but capped by a caller-supplied max level.
    pub fn cards_needed_below(&self, level: u32, rarity: Rarity, max_level: u32) -> u32 {
        let costs = self.costs(rarity);
        if level >= max_level.min(costs.max_level) || level < costs.starting_level {
            return 0;
        }
        costs
            .cards
            .get(&level)
            .copied()
            .unwrap_or(MISSING_ENTRY_CARDS)
    }

    pub fn total_cards_to_max(&self, level: u32, rarity: Rarity) -> u32 {
        self.total_cards_below(level, rarity, self.max_level(rarity))
    }

    pub fn total_cards_below(&self, level: u32, rarity: Rarity, max_level: u32) -> u32 {
        let costs = self.costs(rarity);
        let ceiling = max_level.min(costs.max_level);
        (level..ceiling)
            .map(|l| costs.cards.get(&l).copied().unwrap_or(MISSING_ENTRY_CARDS))
            .sum()
    }

    /// Exact gold lookup for upgrading from `level` to `level + 1`; 0 when unknown.
    pub fn gold_for_upgrade(&self, level: u32, rarity: Rarity) -> u64 {
        if self.is_max_level(level, rarity) {
            return 0;
        }
        self.costs(rarity).gold.get(&level).copied().unwrap_or(0)
    }

    /// Gold for the upgrade from `level`, falling back to the nearest
    /// configured level (lower level wins ties) when no exact entry exists.
    pub fn estimate_gold(&self, level: u32, rarity: Rarity) -> u64 {
        if self.is_max_level(level, rarity) {
            return 0;
        }
        let gold = &self.costs(rarity).gold;
        if let Some(exact) = gold.get(&level) {
            return *exact;
        }
        let below = gold.range(..level).next_back();
        let above = gold.range(level..).next();
        match (below, above) {
            (Some((lo, lo_gold)), Some((hi, hi_gold))) => {
                if level - lo <= hi - level {
                    *lo_gold
                } else {
                    *hi_gold
                }
            }
            (Some((_, gold)), None) | (None, Some((_, gold))) => *gold,
            (None, None) => 0,
        }
    }

    pub fn gold_to_level(&self, from: u32, to: u32, rarity: Rarity) -> u64 {
        (from..to.min(self.max_level(rarity)))
            .map(|level| self.gold_for_upgrade(level, rarity))
            .sum()
    }
}

pub fn gems_for_gold(gold: u64) -> u64 {
    gold.div_ceil(GOLD_PER_GEM)
}

#[cfg(test)]
mod tests {
    use crate::costs::{gems_for_gold, RarityCosts, UpgradeCostTable, MAX_CARD_LEVEL};
    use crate::types::Rarity;

    #[test]
    fn cards_needed_follows_table_and_boundaries() {
        let table = UpgradeCostTable::standard();
        assert_eq!(table.cards_needed(10, Rarity::Common), 1_000);
        assert_eq!(table.cards_needed(12, Rarity::Rare), 400);
        assert_eq!(table.cards_needed(15, Rarity::Legendary), 15);
        assert_eq!(table.cards_needed(MAX_CARD_LEVEL, Rarity::Epic), 0);
        assert_eq!(table.cards_needed(20, Rarity::Champion), 0);
        assert_eq!(table.cards_needed(2, Rarity::Epic), 0);
    }

    #[test]
    fn missing_entries_default_to_two_cards() {
        let table = UpgradeCostTable::standard().with_rarity(
            Rarity::Champion,
            RarityCosts::new(11, 16).with_cards(&[(11, 2)]),
        );
        assert_eq!(table.cards_needed(13, Rarity::Champion), 2);
        assert_eq!(table.total_cards_to_max(11, Rarity::Champion), 2 * 5);
    }

    #[test]
    fn total_to_max_sums_current_inclusive_max_exclusive() {
        let table = UpgradeCostTable::standard();
        assert_eq!(table.total_cards_to_max(14, Rarity::Common), 3_500 + 5_500);
        assert_eq!(table.total_cards_to_max(16, Rarity::Common), 0);
        assert_eq!(table.total_cards_below(12, Rarity::Common, 14), 3_000 + 2_500);
    }

    #[test]
    fn max_level_round_trip() {
        let table = UpgradeCostTable::standard();
        for rarity in Rarity::ALL {
            let max = table.max_level(rarity);
            assert!(table.is_max_level(max, rarity));
            assert_eq!(table.cards_needed(max, rarity), 0);
            assert_eq!(table.total_cards_to_max(max, rarity), 0);
        }
    }

    #[test]
    fn gold_lookup_exact_and_estimated() {
        let table = UpgradeCostTable::standard();
        assert_eq!(table.gold_for_upgrade(10, Rarity::Common), 20_000);
        assert_eq!(table.gold_for_upgrade(3, Rarity::Rare), 50);
        assert_eq!(table.gold_for_upgrade(15, Rarity::Common), 0);
        assert_eq!(table.estimate_gold(15, Rarity::Common), 100_000);
        assert_eq!(table.estimate_gold(5, Rarity::Legendary), 5_000);
        assert_eq!(table.estimate_gold(MAX_CARD_LEVEL, Rarity::Common), 0);
        assert_eq!(
            table.gold_to_level(11, 13, Rarity::Epic),
            50_000 + 100_000
        );
    }

    #[test]
    fn gems_round_up() {
        assert_eq!(gems_for_gold(0), 0);
        assert_eq!(gems_for_gold(17), 1);
        assert_eq!(gems_for_gold(18), 2);
    }
}
