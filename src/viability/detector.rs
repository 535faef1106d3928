use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::archetype::{ArchetypeTemplate, ArchetypeTemplateStore};
use crate::costs::UpgradeCostTable;
use crate::error::AnalysisError;
use crate::providers::{StrategyProvider, SynergyDb, SynergyPair};
use crate::scoring::level_ratio;
use crate::types::CollectionSnapshot;
use crate::viability::strategies::recommend_strategies;
use crate::viability::upgrades::{
    archetype_upgrades, cross_archetype_impacts, gold_to_competitive, key_cards,
};
use crate::viability::{
    DetectedArchetype, DetectionOptions, DynamicArchetypeAnalysis, UnderleveledCard,
    ViabilityTier,
};

const WIN_CONDITION_WEIGHT: f64 = 0.35;
const SUPPORT_WEIGHT: f64 = 0.30;
const SYNERGY_WEIGHT: f64 = 0.20;
const COMPLETENESS_WEIGHT: f64 = 0.15;
const DEFAULT_SYNERGY_SCORE: f64 = 50.0;
const UNDERLEVELED_RATIO: f64 = 0.5;
const TOP_SYNERGIES: usize = 3;

/// Scores every enabled template against a collection.
pub struct ArchetypeViabilityDetector {
    templates: Arc<ArchetypeTemplateStore>,
    synergy: Arc<dyn SynergyDb>,
    strategies: Arc<dyn StrategyProvider>,
    costs: Arc<UpgradeCostTable>,
}

impl ArchetypeViabilityDetector {
    pub fn new(
        templates: Arc<ArchetypeTemplateStore>,
        synergy: Arc<dyn SynergyDb>,
        strategies: Arc<dyn StrategyProvider>,
    ) -> Self {
        Self {
            templates,
            synergy,
            strategies,
            costs: Arc::new(UpgradeCostTable::standard()),
        }
    }

    pub fn with_cost_table(mut self, costs: Arc<UpgradeCostTable>) -> Self {
        self.costs = costs;
        self
    }

    pub fn templates(&self) -> &ArchetypeTemplateStore {
        &self.templates
    }

    pub fn detect(
        &self,
        snapshot: &CollectionSnapshot,
        options: &DetectionOptions,
    ) -> Result<DynamicArchetypeAnalysis, AnalysisError> {
        snapshot.validate()?;
        if snapshot.is_empty() {
            return Err(AnalysisError::InvalidInput(
                "collection has no cards".to_string(),
            ));
        }
        let collection = snapshot.without(&options.exclude_cards);

        let mut evaluated: Vec<(&ArchetypeTemplate, DetectedArchetype)> = self
            .templates
            .templates()
            .iter()
            .map(|template| (template, self.evaluate(template, &collection, options)))
            .collect();

        let (top_upgrade_impacts, key_cards) = if options.include_upgrades {
            let scored: Vec<(&ArchetypeTemplate, f64)> = evaluated
                .iter()
                .map(|(template, detected)| (*template, detected.viability_score))
                .collect();
            let impacts = cross_archetype_impacts(&self.costs, &scored, &collection);
            let keys = key_cards(&impacts);
            let top = impacts
                .into_iter()
                .take(options.top_cross_archetype_upgrades)
                .collect();
            (top, keys)
        } else {
            (Vec::new(), Vec::new())
        };

        evaluated.retain(|(_, detected)| detected.viability_score >= options.min_viability);
        let mut archetypes: Vec<DetectedArchetype> =
            evaluated.into_iter().map(|(_, detected)| detected).collect();
        archetypes.sort_by(|a, b| {
            b.viability_score
                .total_cmp(&a.viability_score)
                .then_with(|| a.name.cmp(&b.name))
        });

        let names_in = |tier: ViabilityTier| -> Vec<String> {
            archetypes
                .iter()
                .filter(|a| a.tier == tier)
                .map(|a| a.name.clone())
                .collect()
        };
        let optimal = names_in(ViabilityTier::Optimal);
        let competitive = names_in(ViabilityTier::Competitive);
        let playable = names_in(ViabilityTier::Playable);
        let blocked = names_in(ViabilityTier::Blocked);

        info!(
            player = snapshot.player_tag.as_str(),
            archetypes = archetypes.len(),
            optimal = optimal.len(),
            competitive = competitive.len(),
            playable = playable.len(),
            blocked = blocked.len(),
            key_cards = key_cards.len(),
            "archetype detection complete"
        );

        Ok(DynamicArchetypeAnalysis {
            player_tag: snapshot.player_tag.clone(),
            player_name: snapshot.player_name.clone(),
            analysis_time: Utc::now(),
            template_fingerprint: self.templates.fingerprint().to_string(),
            archetypes,
            optimal,
            competitive,
            playable,
            blocked,
            top_upgrade_impacts,
            key_cards,
        })
    }

    /// Full per-template result, including the optional augmentations the
    /// options enable.
    pub fn evaluate(
        &self,
        template: &ArchetypeTemplate,
        snapshot: &CollectionSnapshot,
        options: &DetectionOptions,
    ) -> DetectedArchetype {
        let mut detected = self.evaluate_template(template, snapshot);
        if options.include_strategies {
            detected.strategies =
                recommend_strategies(self.strategies.as_ref(), template, detected.average_elixir);
        }
        if options.include_upgrades {
            let mut upgrades =
                archetype_upgrades(&self.costs, template, snapshot, detected.viability_score);
            detected.gold_to_competitive = gold_to_competitive(detected.tier, &upgrades);
            upgrades.truncate(options.top_upgrades_per_archetype);
            detected.upgrades = upgrades;
        }
        detected
    }

    /// Core viability scoring for one template, without strategies or upgrades.
    pub fn evaluate_template(
        &self,
        template: &ArchetypeTemplate,
        snapshot: &CollectionSnapshot,
    ) -> DetectedArchetype {
        let ratio_of = |name: &str| -> Option<f64> {
            snapshot
                .card(name)
                .map(|card| level_ratio(card.level, self.costs.card_max_level(card)))
        };

        let win_card = snapshot.card(&template.win_condition);
        let win_condition_score = ratio_of(&template.win_condition)
            .map(|ratio| ratio * 100.0)
            .unwrap_or(0.0);
        let support_score = self.support_score(template, &ratio_of);
        let (synergy_score, top_synergies) = self.synergy_score(template, snapshot);

        let all_cards = template.all_cards();
        let total_cards = all_cards.len();
        let owned: Vec<&str> = all_cards
            .iter()
            .copied()
            .filter(|name| snapshot.owns(name))
            .collect();
        let completeness_score = if total_cards == 0 {
            0.0
        } else {
            owned.len() as f64 / total_cards as f64 * 100.0
        };

        let viability_score = (WIN_CONDITION_WEIGHT * win_condition_score
            + SUPPORT_WEIGHT * support_score
            + SYNERGY_WEIGHT * synergy_score
            + COMPLETENESS_WEIGHT * completeness_score)
            .clamp(0.0, 100.0);
        let tier = ViabilityTier::from_score(viability_score);

        let missing_cards: Vec<String> = all_cards
            .iter()
            .filter(|name| !snapshot.owns(name))
            .map(|name| name.to_string())
            .collect();

        let underleveled_cards: Vec<UnderleveledCard> = owned
            .iter()
            .filter_map(|name| {
                let card = snapshot.card(name)?;
                let max_level = self.costs.card_max_level(card);
                let ratio = level_ratio(card.level, max_level);
                (ratio < UNDERLEVELED_RATIO).then(|| UnderleveledCard {
                    name: name.to_string(),
                    level: card.level,
                    max_level,
                    level_ratio: ratio,
                })
            })
            .collect();

        let average_elixir = if owned.is_empty() {
            0.0
        } else {
            owned
                .iter()
                .filter_map(|name| snapshot.card(name))
                .map(|card| f64::from(card.elixir_cost))
                .sum::<f64>()
                / owned.len() as f64
        };

        debug!(
            archetype = template.name.as_str(),
            viability = viability_score,
            tier = %tier,
            win = win_condition_score,
            support = support_score,
            synergy = synergy_score,
            completeness = completeness_score,
            "evaluated archetype"
        );

        DetectedArchetype {
            name: template.name.clone(),
            category: template.category,
            win_condition: template.win_condition.clone(),
            viability_score,
            tier,
            win_condition_score,
            support_score,
            synergy_score,
            completeness_score,
            win_condition_level: win_card.map(|card| card.level),
            win_condition_max_level: win_card.map(|card| self.costs.card_max_level(card)),
            owned_cards: owned.len(),
            total_cards,
            missing_cards,
            underleveled_cards,
            top_synergies,
            average_elixir,
            strategies: Vec::new(),
            upgrades: Vec::new(),
            gold_to_competitive: 0,
        }
    }

    fn support_score(
        &self,
        template: &ArchetypeTemplate,
        ratio_of: &dyn Fn(&str) -> Option<f64>,
    ) -> f64 {
        if template.support_cards.is_empty() {
            return 100.0;
        }
        let ratios: Vec<f64> = template
            .support_cards
            .iter()
            .filter_map(|name| ratio_of(name))
            .collect();
        if ratios.is_empty() {
            return 0.0;
        }
        ratios.iter().sum::<f64>() / ratios.len() as f64 * 100.0
    }

    /// Mean of known synergies between the win condition and each owned
    /// support card, and among owned support cards, plus the strongest pairs.
    /// The win condition pairs count even when it is not owned.
    fn synergy_score(
        &self,
        template: &ArchetypeTemplate,
        snapshot: &CollectionSnapshot,
    ) -> (f64, Vec<SynergyPair>) {
        let win = template.win_condition.as_str();
        let mut owned_support: Vec<&str> = Vec::with_capacity(template.support_cards.len());
        for name in &template.support_cards {
            if snapshot.owns(name) && name != win && !owned_support.contains(&name.as_str()) {
                owned_support.push(name.as_str());
            }
        }

        let mut known: Vec<(f64, &str, &str)> = Vec::new();
        for support in &owned_support {
            let value = self.synergy.synergy(win, support);
            if value > 0.0 {
                known.push((value, win, *support));
            }
        }
        for (i, a) in owned_support.iter().enumerate() {
            for b in &owned_support[i + 1..] {
                let value = self.synergy.synergy(a, b);
                if value > 0.0 {
                    known.push((value, *a, *b));
                }
            }
        }
        if known.is_empty() {
            return (DEFAULT_SYNERGY_SCORE, Vec::new());
        }

        let score =
            known.iter().map(|(value, _, _)| value).sum::<f64>() / known.len() as f64 * 100.0;
        known.sort_by(|x, y| y.0.total_cmp(&x.0));
        let top = known
            .iter()
            .filter_map(|(_, a, b)| self.synergy.synergy_pair(a, b))
            .take(TOP_SYNERGIES)
            .collect();
        (score, top)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::archetype::{
        ArchetypeCategory, ArchetypeTemplate, ArchetypeTemplateStore, TemplateDocument,
    };
    use crate::error::AnalysisError;
    use crate::providers::{
        BuiltinStrategies, SynergyCategory, SynergyPair, SynergyTable,
    };
    use crate::types::{CardLevelInfo, CollectionSnapshot, Rarity};
    use crate::viability::{ArchetypeViabilityDetector, DetectionOptions, ViabilityTier};

    fn template(name: &str, win: &str, support: &[&str]) -> ArchetypeTemplate {
        ArchetypeTemplate {
            name: name.to_string(),
            win_condition: win.to_string(),
            support_cards: support.iter().map(|s| s.to_string()).collect(),
            required_cards: Vec::new(),
            min_elixir: 2.5,
            max_elixir: 4.0,
            category: ArchetypeCategory::Cycle,
            enabled: true,
            preferred_strategy: None,
        }
    }

    fn pair(a: &str, b: &str, score: f64) -> SynergyPair {
        SynergyPair {
            card1: a.to_string(),
            card2: b.to_string(),
            synergy_type: SynergyCategory::Cycle,
            score,
            description: String::new(),
        }
    }

    fn detector() -> ArchetypeViabilityDetector {
        let store = ArchetypeTemplateStore::from_document(TemplateDocument {
            version: 1,
            archetypes: vec![
                template("Hog Cycle", "Hog Rider", &["Cannon", "Skeletons"]),
                template("Golem Beatdown", "Golem", &["Night Witch", "Baby Dragon"]),
            ],
        })
        .expect("templates should load");
        let synergy = SynergyTable::new(vec![
            pair("Hog Rider", "Cannon", 0.8),
            pair("Skeletons", "Cannon", 0.6),
            pair("Golem", "Night Witch", 0.95),
        ]);
        ArchetypeViabilityDetector::new(
            Arc::new(store),
            Arc::new(synergy),
            Arc::new(BuiltinStrategies::standard()),
        )
    }

    fn snapshot() -> CollectionSnapshot {
        CollectionSnapshot::new("#PLAYER")
            .with_card("Hog Rider", CardLevelInfo::new(7, 14, Rarity::Rare, 4))
            .with_card("Cannon", CardLevelInfo::new(14, 14, Rarity::Common, 3))
            .with_card("Skeletons", CardLevelInfo::new(7, 14, Rarity::Common, 1))
            .with_card("Night Witch", CardLevelInfo::new(14, 14, Rarity::Legendary, 4))
    }

    #[test]
    fn composite_follows_weighted_components() {
        let d = detector();
        let snap = snapshot();
        let hog = d
            .templates()
            .by_name("Hog Cycle")
            .expect("template present")
            .clone();
        let result = d.evaluate_template(&hog, &snap);
        assert!((result.win_condition_score - 50.0).abs() < 1e-9);
        assert!((result.support_score - 75.0).abs() < 1e-9);
        assert!((result.synergy_score - 70.0).abs() < 1e-9);
        assert!((result.completeness_score - 100.0).abs() < 1e-9);
        assert!((result.viability_score - 69.0).abs() < 1e-9);
        assert_eq!(result.tier, ViabilityTier::Playable);
        assert_eq!(result.top_synergies.len(), 2);
        assert_eq!(result.top_synergies[0].card2, "Cannon");
        assert!(result.underleveled_cards.is_empty());
        assert!(result.missing_cards.is_empty());
        assert!((result.average_elixir - 8.0 / 3.0).abs() < 1e-9);
        assert_eq!(result.win_condition_level, Some(7));
    }

    #[test]
    fn unowned_win_condition_is_blocked() {
        let d = detector();
        let snap = snapshot();
        let golem = d
            .templates()
            .by_name("Golem Beatdown")
            .expect("template present")
            .clone();
        let result = d.evaluate_template(&golem, &snap);
        assert_eq!(result.win_condition_score, 0.0);
        assert!((result.support_score - 100.0).abs() < 1e-9);
        assert!((result.synergy_score - 95.0).abs() < 1e-9);
        assert_eq!(result.top_synergies.len(), 1);
        assert_eq!(result.top_synergies[0].card1, "Golem");
        assert!((result.viability_score - 54.0).abs() < 1e-6);
        assert_eq!(result.tier, ViabilityTier::Blocked);
        assert_eq!(result.missing_cards, vec!["Golem", "Baby Dragon"]);
        assert_eq!(result.win_condition_level, None);
    }

    #[test]
    fn detect_sorts_groups_and_filters() {
        let d = detector();
        let analysis = d
            .detect(&snapshot(), &DetectionOptions::default())
            .expect("detection should succeed");
        assert_eq!(analysis.archetypes.len(), 2);
        assert_eq!(analysis.archetypes[0].name, "Hog Cycle");
        assert_eq!(analysis.playable, vec!["Hog Cycle"]);
        assert_eq!(analysis.blocked, vec!["Golem Beatdown"]);
        assert!(!analysis.archetypes[0].upgrades.is_empty());
        assert!(analysis.archetypes[0].upgrades.len() <= 3);
        assert!(!analysis.top_upgrade_impacts.is_empty());
        for archetype in &analysis.archetypes {
            assert_eq!(
                archetype.tier,
                ViabilityTier::from_score(archetype.viability_score)
            );
        }

        let filtered = d
            .detect(
                &snapshot(),
                &DetectionOptions {
                    min_viability: 60.0,
                    include_strategies: false,
                    include_upgrades: false,
                    ..DetectionOptions::default()
                },
            )
            .expect("detection should succeed");
        assert_eq!(filtered.archetypes.len(), 1);
        assert!(filtered.archetypes[0].strategies.is_empty());
        assert!(filtered.archetypes[0].upgrades.is_empty());
        assert!(filtered.key_cards.is_empty());
    }

    #[test]
    fn excluded_cards_count_as_missing() {
        let d = detector();
        let analysis = d
            .detect(
                &snapshot(),
                &DetectionOptions {
                    exclude_cards: vec!["Hog Rider".to_string()],
                    ..DetectionOptions::default()
                },
            )
            .expect("detection should succeed");
        let hog = analysis
            .archetypes
            .iter()
            .find(|a| a.name == "Hog Cycle")
            .expect("hog cycle present");
        assert_eq!(hog.win_condition_score, 0.0);
        assert!(hog.missing_cards.contains(&"Hog Rider".to_string()));
    }

    #[test]
    fn empty_collection_is_rejected() {
        let d = detector();
        let err = d
            .detect(&CollectionSnapshot::new("#EMPTY"), &DetectionOptions::default())
            .expect_err("empty collection should fail");
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }
}
