use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    WinCondition,
    Building,
    BigSpell,
    SmallSpell,
    Support,
    Cycle,
    None,
}

impl Role {
    /// Overlap precedence: earlier roles win when a card sits in several tables.
    pub const PRECEDENCE: [Role; 6] = [
        Role::WinCondition,
        Role::Building,
        Role::BigSpell,
        Role::SmallSpell,
        Role::Cycle,
        Role::Support,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::WinCondition => "win_conditions",
            Self::Building => "buildings",
            Self::BigSpell => "spells_big",
            Self::SmallSpell => "spells_small",
            Self::Support => "support",
            Self::Cycle => "cycle",
            Self::None => "none",
        }
    }

    pub fn is_assigned(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn is_spell(&self) -> bool {
        matches!(self, Self::BigSpell | Self::SmallSpell)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::WinCondition => "Primary tower damage dealer the deck is built around",
            Self::Building => "Defensive structure that pulls and absorbs pushes",
            Self::BigSpell => "High-damage spell for finishing towers or clearing support",
            Self::SmallSpell => "Cheap spell for swarms and resets",
            Self::Support => "Mid-cost troop backing pushes and defending",
            Self::Cycle => "Cheap card used to rotate back to key cards",
            Self::None => "Unclassified",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let display = match self {
            Self::WinCondition => "Win Condition",
            Self::Building => "Building",
            Self::BigSpell => "Big Spell",
            Self::SmallSpell => "Small Spell",
            Self::Support => "Support",
            Self::Cycle => "Cycle",
            Self::None => "-",
        };
        write!(f, "{display}")
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "win_condition" | "win_conditions" | "wincon" => Ok(Self::WinCondition),
            "building" | "buildings" => Ok(Self::Building),
            "big_spell" | "spells_big" => Ok(Self::BigSpell),
            "small_spell" | "spells_small" => Ok(Self::SmallSpell),
            "support" => Ok(Self::Support),
            "cycle" => Ok(Self::Cycle),
            "none" => Ok(Self::None),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}

const WIN_CONDITIONS: &[&str] = &[
    "Royal Giant",
    "Hog Rider",
    "Giant",
    "P.E.K.K.A",
    "Giant Skeleton",
    "Goblin Barrel",
    "Mortar",
    "X-Bow",
    "Royal Hogs",
    "Golem",
    "Lava Hound",
    "Electro Giant",
    "Balloon",
    "Miner",
    "Graveyard",
    "Three Musketeers",
    "Mega Knight",
    "Royal Ghost",
    "Goblin Drill",
    "Skeleton King",
    "Ram Rider",
    "Battle Ram",
    "Wall Breakers",
    "Elixir Golem",
    "Goblin Giant",
    "Sparky",
];

const BUILDINGS: &[&str] = &[
    "Cannon",
    "Goblin Cage",
    "Inferno Tower",
    "Bomb Tower",
    "Tombstone",
    "Goblin Hut",
    "Barbarian Hut",
    "Tesla",
    "Furnace",
    "Elixir Collector",
    "Cannon Cart",
];

const BIG_SPELLS: &[&str] = &["Fireball", "Poison", "Lightning", "Rocket", "Earthquake"];

const SMALL_SPELLS: &[&str] = &[
    "Zap",
    "Arrows",
    "Giant Snowball",
    "Barbarian Barrel",
    "Freeze",
    "Log",
    "The Log",
    "Tornado",
    "Rage",
    "Royal Delivery",
];

const SUPPORT: &[&str] = &[
    "Archers",
    "Bomber",
    "Musketeer",
    "Wizard",
    "Mega Minion",
    "Valkyrie",
    "Baby Dragon",
    "Skeleton Dragons",
    "Witch",
    "Electro Wizard",
    "Ice Wizard",
    "Night Witch",
    "Princess",
    "Dart Goblin",
    "Magic Archer",
    "Inferno Dragon",
    "Hunter",
    "Executioner",
    "Firecracker",
    "Lumberjack",
    "Bowler",
];

const CYCLE: &[&str] = &[
    "Knight",
    "Skeletons",
    "Ice Spirit",
    "Electro Spirit",
    "Fire Spirit",
    "Bats",
    "Spear Goblins",
    "Goblin Gang",
    "Minions",
    "Ice Golem",
    "Heal Spirit",
    "Goblins",
    "Wall Breakers",
];

fn curated_table(role: Role) -> &'static [&'static str] {
    match role {
        Role::WinCondition => WIN_CONDITIONS,
        Role::Building => BUILDINGS,
        Role::BigSpell => BIG_SPELLS,
        Role::SmallSpell => SMALL_SPELLS,
        Role::Support => SUPPORT,
        Role::Cycle => CYCLE,
        Role::None => &[],
    }
}

/// Name → role lookup with an elixir-cost fallback for unknown cards.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleClassifier {
    roles: BTreeMap<String, Role>,
}

impl Default for RoleClassifier {
    fn default() -> Self {
        Self::standard()
    }
}

impl RoleClassifier {
    pub fn standard() -> Self {
        let mut roles = BTreeMap::new();
        // Lowest precedence first so higher-precedence tables overwrite overlaps.
        for role in Role::PRECEDENCE.iter().rev() {
            for name in curated_table(*role) {
                roles.insert(normalize_name(name), *role);
            }
        }
        Self { roles }
    }

    pub fn with_override(mut self, name: &str, role: Role) -> Self {
        self.roles.insert(normalize_name(name), role);
        self
    }

    /// Role from the curated tables only; `Role::None` for unknown names.
    pub fn curated_role(&self, name: &str) -> Role {
        self.roles
            .get(&normalize_name(name))
            .copied()
            .unwrap_or(Role::None)
    }

    pub fn classify(&self, name: &str, elixir_cost: u32) -> Role {
        match self.curated_role(name) {
            Role::None => role_from_elixir(elixir_cost),
            role => role,
        }
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

pub fn role_from_elixir(elixir_cost: u32) -> Role {
    match elixir_cost {
        0..=2 => Role::Cycle,
        3..=5 => Role::Support,
        _ => Role::WinCondition,
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

pub fn count_roles(roles: &[Role]) -> BTreeMap<Role, usize> {
    let mut counts = BTreeMap::new();
    for role in roles {
        *counts.entry(*role).or_insert(0) += 1;
    }
    counts
}

/// A deck needs a win condition, a spell, and either a building or support troop.
pub fn has_balanced_roles(roles: &[Role]) -> bool {
    let present: BTreeSet<Role> = roles.iter().copied().collect();
    present.contains(&Role::WinCondition)
        && (present.contains(&Role::BigSpell) || present.contains(&Role::SmallSpell))
        && (present.contains(&Role::Building) || present.contains(&Role::Support))
}

#[cfg(test)]
mod tests {
    use crate::scoring::roles::{
        count_roles, has_balanced_roles, role_from_elixir, Role, RoleClassifier,
    };

    #[test]
    fn curated_tables_resolve_known_cards() {
        let classifier = RoleClassifier::standard();
        assert_eq!(classifier.classify("Hog Rider", 4), Role::WinCondition);
        assert_eq!(classifier.classify("Cannon", 3), Role::Building);
        assert_eq!(classifier.classify("Fireball", 4), Role::BigSpell);
        assert_eq!(classifier.classify("the log", 2), Role::SmallSpell);
        assert_eq!(classifier.classify("Musketeer", 4), Role::Support);
        assert_eq!(classifier.classify("Ice Spirit", 1), Role::Cycle);
    }

    #[test]
    fn overlap_resolves_by_precedence() {
        // Wall Breakers sits in both the win-condition and cycle pools.
        let classifier = RoleClassifier::standard().with_override("Knight", Role::Cycle);
        assert_eq!(classifier.curated_role("Wall Breakers"), Role::WinCondition);
        assert_eq!(classifier.curated_role("Knight"), Role::Cycle);
    }

    #[test]
    fn unknown_cards_fall_back_to_elixir() {
        let classifier = RoleClassifier::standard();
        assert_eq!(classifier.curated_role("Mystery Card"), Role::None);
        assert_eq!(classifier.classify("Mystery Card", 1), Role::Cycle);
        assert_eq!(classifier.classify("Mystery Card", 2), Role::Cycle);
        assert_eq!(classifier.classify("Mystery Card", 4), Role::Support);
        assert_eq!(classifier.classify("Mystery Card", 7), Role::WinCondition);
        assert_eq!(role_from_elixir(5), Role::Support);
        assert_eq!(role_from_elixir(6), Role::WinCondition);
    }

    #[test]
    fn balanced_roles_require_core_pieces() {
        let balanced = [Role::WinCondition, Role::SmallSpell, Role::Building, Role::Cycle];
        assert!(has_balanced_roles(&balanced));
        assert!(!has_balanced_roles(&[Role::Support, Role::Cycle, Role::BigSpell]));
        let counts = count_roles(&[Role::Cycle, Role::Cycle, Role::Support]);
        assert_eq!(counts.get(&Role::Cycle), Some(&2));
    }

    #[test]
    fn role_slugs_parse_back() {
        for role in Role::PRECEDENCE {
            assert_eq!(role.as_slug().parse::<Role>().ok(), Some(role));
        }
    }
}
