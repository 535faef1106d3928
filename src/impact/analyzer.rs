use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::archetype::{ArchetypeTemplate, ArchetypeTemplateStore, TemplateSlot};
use crate::costs::UpgradeCostTable;
use crate::error::AnalysisError;
use crate::impact::unlock::build_unlock_tree;
use crate::impact::{
    CardUpgradeImpact, DeckImpactSummary, ImpactOptions, ImpactSummary, KeyCard,
    UpgradeImpactAnalysis,
};
use crate::scoring::{score_card_with_evolution, Role, RoleClassifier};
use crate::types::{CardLevelInfo, CollectionSnapshot};

const WIN_CONDITION_SHARE: f64 = 0.4;
const SUPPORT_SHARE: f64 = 0.6;

const SCORE_DELTA_WEIGHT: f64 = 0.30;
const DECK_IMPROVEMENT_WEIGHT: f64 = 0.30;
const UNLOCK_WEIGHT: f64 = 0.25;
const ROLE_WEIGHT: f64 = 0.15;

fn role_importance(role: Role) -> f64 {
    match role {
        Role::WinCondition => 1.0,
        Role::Building => 0.7,
        Role::BigSpell => 0.6,
        Role::SmallSpell => 0.5,
        _ => 0.4,
    }
}

/// Ranks cards by how much a single level moves archetype composites.
pub struct UpgradeImpactAnalyzer {
    templates: Arc<ArchetypeTemplateStore>,
    classifier: Arc<RoleClassifier>,
    costs: Arc<UpgradeCostTable>,
}

impl UpgradeImpactAnalyzer {
    pub fn new(
        templates: Arc<ArchetypeTemplateStore>,
        classifier: Arc<RoleClassifier>,
        costs: Arc<UpgradeCostTable>,
    ) -> Self {
        Self {
            templates,
            classifier,
            costs,
        }
    }

    pub fn templates(&self) -> &ArchetypeTemplateStore {
        &self.templates
    }

    pub fn costs(&self) -> &UpgradeCostTable {
        &self.costs
    }

    pub fn analyze(
        &self,
        snapshot: &CollectionSnapshot,
        options: &ImpactOptions,
    ) -> Result<UpgradeImpactAnalysis, AnalysisError> {
        snapshot.validate()?;
        if snapshot.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "collection has no cards".to_string(),
            ));
        }

        let mut card_impacts: Vec<CardUpgradeImpact> = snapshot
            .cards
            .iter()
            .filter(|(name, card)| {
                if options.excludes(name) || !options.accepts_rarity(card.rarity) {
                    return false;
                }
                options.include_max_level || card.level < self.costs.card_max_level(card)
            })
            .map(|(name, card)| self.card_impact(name, card, snapshot, options.viability_threshold))
            .collect();
        card_impacts.sort_by(|a, b| {
            b.impact_score
                .total_cmp(&a.impact_score)
                .then_with(|| a.card_name.cmp(&b.card_name))
        });

        let mut key_cards: Vec<KeyCard> = card_impacts
            .iter()
            .filter(|impact| impact.is_key_card)
            .map(KeyCard::from_impact)
            .collect();
        key_cards.sort_by(|a, b| {
            b.deck_unlock_count
                .cmp(&a.deck_unlock_count)
                .then_with(|| b.impact_score.total_cmp(&a.impact_score))
        });

        let unlock_tree = build_unlock_tree(self, snapshot, options.viability_threshold);
        let summary = ImpactSummary::from_impacts(&card_impacts, key_cards.len());
        let top_impacts = card_impacts.iter().take(options.top_n).cloned().collect();

        info!(
            player = snapshot.player_tag.as_str(),
            cards = summary.total_cards_analyzed,
            key_cards = summary.key_cards_identified,
            potential_unlocks = summary.potential_unlocks,
            "upgrade impact analysis complete"
        );

        Ok(UpgradeImpactAnalysis {
            player_tag: snapshot.player_tag.clone(),
            player_name: snapshot.player_name.clone(),
            analysis_time: Utc::now(),
            card_impacts,
            key_cards,
            unlock_tree,
            top_impacts,
            summary,
        })
    }

    /// Evolution-aware card strength at `level`, capped at the card's max.
    /// Archetype composites leave the role bonus out.
    pub fn card_score_at(&self, card: &CardLevelInfo, level: u32) -> f64 {
        let max_level = self.costs.card_max_level(card);
        score_card_with_evolution(
            level.min(max_level),
            max_level,
            card.rarity,
            card.elixir_cost,
            Role::None,
            card.evolution_level,
            card.max_evolution_level,
        )
    }

    /// 0..1-ish composite: 40% win condition, 60% mean of owned support cards.
    pub fn composite_score(
        &self,
        template: &ArchetypeTemplate,
        snapshot: &CollectionSnapshot,
    ) -> f64 {
        self.composite(template, snapshot, None)
    }

    pub fn composite_with_upgrade(
        &self,
        template: &ArchetypeTemplate,
        snapshot: &CollectionSnapshot,
        card_name: &str,
        new_level: u32,
    ) -> f64 {
        self.composite(template, snapshot, Some((card_name, new_level)))
    }

    fn composite(
        &self,
        template: &ArchetypeTemplate,
        snapshot: &CollectionSnapshot,
        upgrade: Option<(&str, u32)>,
    ) -> f64 {
        let score_of = |name: &str, card: &CardLevelInfo| -> f64 {
            let level = match upgrade {
                Some((upgraded, level)) if upgraded == name => level,
                _ => card.level,
            };
            self.card_score_at(card, level)
        };

        let win_score = snapshot
            .card(&template.win_condition)
            .map(|card| score_of(&template.win_condition, card))
            .unwrap_or(0.0);

        let support: Vec<f64> = template
            .support_cards
            .iter()
            .filter_map(|name| snapshot.card(name).map(|card| score_of(name, card)))
            .collect();
        let support_score = if support.is_empty() {
            0.0
        } else {
            support.iter().sum::<f64>() / support.len() as f64
        };

        WIN_CONDITION_SHARE * win_score + SUPPORT_SHARE * support_score
    }

    pub fn card_impact(
        &self,
        name: &str,
        card: &CardLevelInfo,
        snapshot: &CollectionSnapshot,
        viability_threshold: f64,
    ) -> CardUpgradeImpact {
        let max_level = self.costs.card_max_level(card);
        let upgraded_level = (card.level + 1).min(max_level).max(card.level);
        let score_delta =
            self.card_score_at(card, upgraded_level) - self.card_score_at(card, card.level);

        let affected_decks: Vec<DeckImpactSummary> = self
            .templates
            .templates()
            .iter()
            .filter_map(|template| {
                if !snapshot.owns(&template.win_condition) {
                    return None;
                }
                let card_role = match template.slot_of(name)? {
                    TemplateSlot::WinCondition => TemplateSlot::WinCondition,
                    TemplateSlot::Support => TemplateSlot::Support,
                    TemplateSlot::Required => return None,
                };
                let current_score = self.composite_score(template, snapshot);
                let projected_score =
                    self.composite_with_upgrade(template, snapshot, name, upgraded_level);
                Some(DeckImpactSummary {
                    archetype: template.name.clone(),
                    win_condition: template.win_condition.clone(),
                    card_role,
                    current_score,
                    projected_score,
                    score_delta: projected_score - current_score,
                    becomes_viable: current_score < viability_threshold
                        && projected_score >= viability_threshold,
                })
            })
            .collect();

        let viable_decks_count = affected_decks
            .iter()
            .filter(|deck| deck.projected_score >= viability_threshold)
            .count();
        let unlocks_archetypes: Vec<String> = affected_decks
            .iter()
            .filter(|deck| deck.becomes_viable)
            .map(|deck| deck.archetype.clone())
            .collect();
        let unlock_potential = unlocks_archetypes.len();
        let max_deck_improvement = affected_decks
            .iter()
            .map(|deck| deck.score_delta)
            .fold(0.0, f64::max);
        let avg_deck_improvement = if affected_decks.is_empty() {
            0.0
        } else {
            affected_decks.iter().map(|deck| deck.score_delta).sum::<f64>()
                / affected_decks.len() as f64
        };

        let role = self.classifier.curated_role(name);
        let archetype_count = self.templates.len().max(1) as f64;
        let impact_score = SCORE_DELTA_WEIGHT * score_delta * 100.0
            + DECK_IMPROVEMENT_WEIGHT * avg_deck_improvement * 100.0
            + UNLOCK_WEIGHT * (unlock_potential as f64 / archetype_count * 100.0)
            + ROLE_WEIGHT * role_importance(role);

        let gold_cost = self.costs.gold_for_upgrade(card.level, card.rarity);
        let value_per_gold = if gold_cost > 0 {
            impact_score / gold_cost as f64 * 1000.0
        } else {
            0.0
        };

        debug!(
            card = name,
            impact = impact_score,
            decks = affected_decks.len(),
            unlocks = unlock_potential,
            "scored card upgrade impact"
        );

        CardUpgradeImpact {
            card_name: name.to_string(),
            rarity: card.rarity,
            current_level: card.level,
            max_level,
            upgraded_level,
            elixir: card.elixir_cost,
            role,
            score_delta,
            viable_decks_count,
            avg_deck_improvement,
            max_deck_improvement,
            unlock_potential,
            impact_score,
            affected_decks,
            gold_cost,
            value_per_gold,
            is_key_card: unlock_potential >= 2,
            unlocks_archetypes,
        }
    }
}
