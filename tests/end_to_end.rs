use std::collections::BTreeSet;
use std::sync::Arc;

use deck_oracle::archetype::ArchetypeTemplateStore;
use deck_oracle::costs::{collection_upgrade_info, get_upgrade_priorities, UpgradeCostTable};
use deck_oracle::deck::{BuildOptions, DeckBuilder, DECK_SIZE};
use deck_oracle::impact::{ImpactOptions, UpgradeImpactAnalyzer};
use deck_oracle::providers::{BuiltinStrategies, SynergyTable};
use deck_oracle::scoring::RoleClassifier;
use deck_oracle::viability::{ArchetypeViabilityDetector, DetectionOptions, ViabilityTier};
use deck_oracle::{CollectionSnapshot, Rarity};
use serde_json::json;

fn collection() -> CollectionSnapshot {
    let raw = json!({
        "player_tag": "#2PP",
        "player_name": "Ladder Grinder",
        "cards": {
            "Hog Rider": {"level": 13, "max_level": 14, "rarity": "rare", "elixir_cost": 4, "count": 120},
            "Cannon": {"level": 14, "max_level": 14, "rarity": "common", "elixir_cost": 3},
            "Skeletons": {"level": 13, "max_level": 14, "rarity": "common", "elixir_cost": 1, "count": 900,
                          "evolution_level": 1, "max_evolution_level": 1},
            "Ice Spirit": {"level": 12, "max_level": 14, "rarity": "common", "elixir_cost": 1},
            "Ice Golem": {"level": 12, "max_level": 14, "rarity": "rare", "elixir_cost": 2},
            "Musketeer": {"level": 13, "max_level": 14, "rarity": "rare", "elixir_cost": 4},
            "Fireball": {"level": 12, "max_level": 14, "rarity": "rare", "elixir_cost": 4},
            "The Log": {"level": 11, "max_level": 14, "rarity": "legendary", "elixir_cost": 2},
            "Golem": {"level": 9, "max_level": 14, "rarity": "epic", "elixir_cost": 8},
            "Night Witch": {"level": 10, "max_level": 14, "rarity": "legendary", "elixir_cost": 4},
            "Baby Dragon": {"level": 11, "max_level": 14, "rarity": "epic", "elixir_cost": 4},
            "Lightning": {"level": 10, "max_level": 14, "rarity": "epic", "elixir_cost": 6},
            "Zap": {"level": 14, "max_level": 14, "rarity": "common", "elixir_cost": 2},
            "Knight": {"level": 13, "max_level": 14, "rarity": "common", "elixir_cost": 3},
            "Archers": {"level": 12, "max_level": 14, "rarity": "common", "elixir_cost": 3},
            "Valkyrie": {"level": 12, "max_level": 14, "rarity": "rare", "elixir_cost": 4},
            "Miner": {"level": 11, "max_level": 14, "rarity": "legendary", "elixir_cost": 3},
            "Poison": {"level": 11, "max_level": 14, "rarity": "epic", "elixir_cost": 4},
            "Tornado": {"level": 10, "max_level": 14, "rarity": "epic", "elixir_cost": 3}
        }
    });
    serde_json::from_value(raw).expect("collection JSON should parse")
}

#[test]
fn snapshot_json_uses_aliases_and_case_insensitive_rarity() {
    let snapshot = collection();
    let hog = snapshot.card("Hog Rider").expect("hog present");
    assert_eq!(hog.rarity, Rarity::Rare);
    assert_eq!(hog.owned_count, 120);
    assert!(snapshot.validate().is_ok());
}

#[test]
fn deck_build_produces_valid_eight_card_deck() {
    let builder = DeckBuilder::new(
        Arc::new(RoleClassifier::standard()),
        Arc::new(UpgradeCostTable::standard()),
    )
    .with_options(BuildOptions {
        unlocked_evolutions: vec!["Skeletons".to_string()],
        ..BuildOptions::default()
    });
    let deck = builder.build(&collection()).expect("deck should build");
    assert_eq!(deck.deck.len(), DECK_SIZE);
    let unique: BTreeSet<&str> = deck.deck.iter().map(String::as_str).collect();
    assert_eq!(unique.len(), DECK_SIZE);
    assert!((0.0..=10.0).contains(&deck.average_elixir));
    assert!(deck.validate().is_ok());
    assert!(deck.deck.contains(&"Skeletons".to_string()));
    assert!(deck.evolution_slots.contains(&"Skeletons".to_string()));
}

#[test]
fn archetype_detection_covers_every_bundled_template() {
    let store = Arc::new(ArchetypeTemplateStore::bundled().expect("bundled templates"));
    let detector = ArchetypeViabilityDetector::new(
        store.clone(),
        Arc::new(SynergyTable::bundled().expect("bundled synergy")),
        Arc::new(BuiltinStrategies::standard()),
    );
    let analysis = detector
        .detect(&collection(), &DetectionOptions::default())
        .expect("detection should succeed");

    assert_eq!(analysis.archetypes.len(), store.len());
    assert_eq!(analysis.template_fingerprint, store.fingerprint());
    let grouped = analysis.optimal.len()
        + analysis.competitive.len()
        + analysis.playable.len()
        + analysis.blocked.len();
    assert_eq!(grouped, store.len());
    assert!(analysis
        .archetypes
        .windows(2)
        .all(|w| w[0].viability_score >= w[1].viability_score));
    for archetype in &analysis.archetypes {
        assert!((0.0..=100.0).contains(&archetype.viability_score));
        assert_eq!(
            archetype.tier,
            ViabilityTier::from_score(archetype.viability_score)
        );
        if archetype.win_condition_level.is_none() {
            assert_eq!(archetype.win_condition_score, 0.0);
        }
        assert!(archetype.upgrades.len() <= 3);
        assert!(archetype
            .strategies
            .iter()
            .all(|s| s.compatibility_score >= 40.0));
    }

    let hog = analysis
        .archetypes
        .iter()
        .find(|a| a.win_condition == "Hog Rider")
        .expect("a hog archetype is bundled");
    assert!(hog.viability_score > 60.0);
}

#[test]
fn upgrade_impact_ranks_cards_and_builds_unlock_tree() {
    let store = Arc::new(ArchetypeTemplateStore::bundled().expect("bundled templates"));
    let analyzer = UpgradeImpactAnalyzer::new(
        store.clone(),
        Arc::new(RoleClassifier::standard()),
        Arc::new(UpgradeCostTable::standard()),
    );
    let analysis = analyzer
        .analyze(&collection(), &ImpactOptions::default().with_top_n(5))
        .expect("analysis should succeed");

    assert!(analysis.top_impacts.len() <= 5);
    assert!(analysis
        .card_impacts
        .windows(2)
        .all(|w| w[0].impact_score >= w[1].impact_score));
    assert!(analysis
        .card_impacts
        .iter()
        .all(|i| i.card_name != "Zap" && i.card_name != "Cannon"));
    assert_eq!(analysis.unlock_tree.len(), store.len());
    assert_eq!(
        analysis.summary.total_cards_analyzed,
        analysis.card_impacts.len()
    );
    for node in &analysis.unlock_tree {
        assert!(node.upgrades_needed.len() <= 3);
    }
}

#[test]
fn upgrade_priorities_skip_maxed_cards() {
    let costs = UpgradeCostTable::standard();
    let infos = collection_upgrade_info(&costs, &collection());
    let priorities = get_upgrade_priorities(&infos, 10.0, 5);
    assert!(priorities.len() <= 5);
    assert!(priorities.iter().all(|p| p.score >= 10.0));
    assert!(priorities.iter().all(|p| !p.info.is_max_level));
    assert!(priorities.windows(2).all(|w| w[0].score >= w[1].score));
}
