use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::costs::UpgradeCostTable;
use crate::deck::upgrades::suggest_deck_upgrades;
use crate::deck::{BuildOptions, CardDetail, DeckRecommendation};
use crate::error::AnalysisError;
use crate::scoring::candidates::{average_elixir, sort_by_score};
use crate::scoring::{CardCandidate, Role, RoleClassifier};
use crate::types::CollectionSnapshot;

pub const DECK_SIZE: usize = 8;

/// Structural slots filled in order before backfilling by score.
const SLOT_PLAN: [(Role, usize); 6] = [
    (Role::WinCondition, 1),
    (Role::Building, 1),
    (Role::BigSpell, 1),
    (Role::SmallSpell, 1),
    (Role::Support, 2),
    (Role::Cycle, 2),
];

const HIGH_ELIXIR: f64 = 3.8;
const LOW_ELIXIR: f64 = 2.8;

fn evolution_priority(role: Role) -> u8 {
    match role {
        Role::WinCondition => 1,
        Role::Building => 2,
        Role::BigSpell => 3,
        Role::Support => 4,
        Role::SmallSpell => 5,
        Role::Cycle => 6,
        Role::None => 100,
    }
}

fn evolution_bias(candidate: &CardCandidate) -> f64 {
    let extra_stages = f64::from(candidate.max_evolution_level.saturating_sub(1));
    0.25 * candidate.level_ratio().powf(1.5) * (1.0 + 0.2 * extra_stages)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Debug, Clone)]
pub struct DeckBuilder {
    classifier: Arc<RoleClassifier>,
    costs: Arc<UpgradeCostTable>,
    options: BuildOptions,
}

impl DeckBuilder {
    pub fn new(classifier: Arc<RoleClassifier>, costs: Arc<UpgradeCostTable>) -> Self {
        Self {
            classifier,
            costs,
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn build(
        &self,
        snapshot: &CollectionSnapshot,
    ) -> Result<DeckRecommendation, AnalysisError> {
        snapshot.validate()?;
        let pool = self.candidates(snapshot);
        if pool.len() < DECK_SIZE {
            return Err(AnalysisError::InsufficientCards {
                available: pool.len(),
                required: DECK_SIZE,
            });
        }

        let mut notes = Vec::new();
        let deck = self.select(pool, &mut notes);
        let average = round_to(average_elixir(&deck), 2);
        notes.extend(composition_notes(&deck, average));

        let evolution_slots = self.evolution_slots(&deck);
        if !evolution_slots.is_empty() {
            notes.push(format!("Evolution slots: {}", evolution_slots.join(", ")));
        }

        let recommendation = DeckRecommendation {
            player_tag: snapshot.player_tag.clone(),
            deck: deck.iter().map(|c| c.name.clone()).collect(),
            cards: deck
                .iter()
                .map(|c| CardDetail {
                    name: c.name.clone(),
                    level: c.level,
                    max_level: c.max_level,
                    rarity: c.rarity,
                    elixir: c.elixir,
                    role: c.role,
                    score: round_to(c.score, 3),
                    evolution_level: c.evolution_level,
                    max_evolution_level: c.max_evolution_level,
                })
                .collect(),
            average_elixir: average,
            evolution_slots,
            notes,
            upgrades: suggest_deck_upgrades(&self.costs, &deck),
            built_at: Utc::now(),
        };
        recommendation.validate()?;

        info!(
            player = recommendation.player_tag.as_str(),
            average_elixir = recommendation.average_elixir,
            "built deck"
        );
        Ok(recommendation)
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.options
            .exclude_cards
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(name))
    }

    fn evolution_ready(&self, candidate: &CardCandidate) -> bool {
        candidate.max_evolution_level > 0 && self.options.has_unlocked_evolution(&candidate.name)
    }

    fn candidates(&self, snapshot: &CollectionSnapshot) -> Vec<CardCandidate> {
        let mut pool: Vec<CardCandidate> = snapshot
            .cards
            .iter()
            .filter(|(name, _)| !self.is_excluded(name))
            .map(|(name, card)| {
                let mut candidate = CardCandidate::from_card(name, card, &self.classifier);
                if self.evolution_ready(&candidate) {
                    candidate.score += evolution_bias(&candidate);
                }
                candidate
            })
            .collect();
        sort_by_score(&mut pool);
        pool
    }

    /// `pool` must already be sorted best first.
    fn select(&self, mut pool: Vec<CardCandidate>, notes: &mut Vec<String>) -> Vec<CardCandidate> {
        let mut deck: Vec<CardCandidate> = Vec::with_capacity(DECK_SIZE);

        for name in &self.options.include_cards {
            if deck.len() >= DECK_SIZE {
                break;
            }
            match pool.iter().position(|c| c.name.eq_ignore_ascii_case(name)) {
                Some(idx) => deck.push(pool.remove(idx)),
                None => warn!(card = name.as_str(), "included card not available; skipping"),
            }
        }

        for (role, quota) in SLOT_PLAN {
            let mut filled = deck.iter().filter(|c| c.role == role).count();
            while filled < quota && deck.len() < DECK_SIZE {
                let Some(idx) = pool.iter().position(|c| c.role == role) else {
                    debug!(role = role.as_slug(), "no candidate left for role");
                    break;
                };
                deck.push(pool.remove(idx));
                filled += 1;
            }
        }

        if !deck.iter().any(|c| c.role == Role::WinCondition) {
            notes.push("No win condition found; selected highest power cards instead.".to_string());
        }

        let backfill = DECK_SIZE.saturating_sub(deck.len()).min(pool.len());
        deck.extend(pool.drain(..backfill));
        deck
    }

    fn evolution_slots(&self, deck: &[CardCandidate]) -> Vec<String> {
        let mut ready: Vec<&CardCandidate> =
            deck.iter().filter(|c| self.evolution_ready(c)).collect();
        ready.sort_by(|a, b| {
            evolution_priority(a.role)
                .cmp(&evolution_priority(b.role))
                .then_with(|| b.score.total_cmp(&a.score))
                .then_with(|| a.name.cmp(&b.name))
        });
        ready
            .into_iter()
            .take(self.options.evolution_slot_limit)
            .map(|c| c.name.clone())
            .collect()
    }
}

fn composition_notes(deck: &[CardCandidate], average: f64) -> Vec<String> {
    let mut notes = Vec::new();
    if !deck.iter().any(|c| c.role == Role::Building) {
        notes.push("No defensive building available; play troops high to kite.".to_string());
    }
    if !deck.iter().any(|c| c.role.is_spell()) {
        notes.push("No spell picked; beware of swarm matchups.".to_string());
    }
    if average > HIGH_ELIXIR {
        notes.push("High average elixir; play patiently and build pushes.".to_string());
    } else if average < LOW_ELIXIR {
        notes.push("Low average elixir; pressure often and out-cycle counters.".to_string());
    }
    notes
}
