use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::archetype::ArchetypeTemplateStore;
use crate::costs::{PriorityLevel, UpgradePriority};
use crate::deck::DeckRecommendation;
use crate::impact::{UnlockStatus, UpgradeImpactAnalysis};
use crate::viability::{DynamicArchetypeAnalysis, ViabilityTier};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn tier_cell(tier: ViabilityTier) -> Cell {
    let color = match tier {
        ViabilityTier::Optimal => Color::Green,
        ViabilityTier::Competitive => Color::Cyan,
        ViabilityTier::Playable => Color::Yellow,
        ViabilityTier::Blocked => Color::Red,
    };
    Cell::new(tier.to_string().to_uppercase()).fg(color)
}

pub fn render_deck_table(deck: &DeckRecommendation) -> String {
    let mut table = new_table();
    table.set_header(vec!["Card", "Role", "Level", "Rarity", "Elixir", "Score", "Evo"]);
    for card in &deck.cards {
        let evo = if deck.evolution_slots.contains(&card.name) {
            Cell::new("EVO").fg(Color::Magenta)
        } else {
            Cell::new("-")
        };
        table.add_row(Row::from(vec![
            Cell::new(&card.name),
            Cell::new(card.role.to_string()),
            Cell::new(format!("{}/{}", card.level, card.max_level)),
            Cell::new(card.rarity.to_string()),
            Cell::new(card.elixir.to_string()),
            Cell::new(format!("{:.3}", card.score)),
            evo,
        ]));
    }

    let mut out = table.to_string();
    out.push_str(&format!("\nAverage elixir: {:.2}", deck.average_elixir));
    for note in &deck.notes {
        out.push_str(&format!("\n- {note}"));
    }
    if !deck.upgrades.is_empty() {
        let mut upgrades = new_table();
        upgrades.set_header(vec!["Upgrade", "Level", "Impact", "Gold", "Value/1k", "Reason"]);
        for u in &deck.upgrades {
            upgrades.add_row(vec![
                u.card_name.clone(),
                format!("{} -> {}", u.current_level, u.target_level),
                format!("{:.1}", u.impact_score),
                u.gold_cost.to_string(),
                format!("{:.2}", u.value_per_1k_gold),
                u.reason.clone(),
            ]);
        }
        out.push('\n');
        out.push_str(&upgrades.to_string());
    }
    out
}

pub fn render_archetypes_table(analysis: &DynamicArchetypeAnalysis) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Archetype",
        "Tier",
        "Viability",
        "Win Con",
        "Support",
        "Synergy",
        "Owned",
        "Top Strategy",
        "Gold to Competitive",
    ]);
    for a in &analysis.archetypes {
        let strategy = a
            .strategies
            .first()
            .map(|s| format!("{} ({:.0})", s.strategy, s.compatibility_score))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(Row::from(vec![
            Cell::new(&a.name),
            tier_cell(a.tier),
            Cell::new(format!("{:.1}", a.viability_score)),
            Cell::new(format!("{:.0}", a.win_condition_score)),
            Cell::new(format!("{:.0}", a.support_score)),
            Cell::new(format!("{:.0}", a.synergy_score)),
            Cell::new(format!("{}/{}", a.owned_cards, a.total_cards)),
            Cell::new(strategy),
            Cell::new(if a.gold_to_competitive > 0 {
                a.gold_to_competitive.to_string()
            } else {
                "-".to_string()
            }),
        ]));
    }

    let mut out = table.to_string();
    if !analysis.key_cards.is_empty() {
        let mut keys = new_table();
        keys.set_header(vec!["Key Card", "Level", "Tiers Raised", "Total Gain", "Gold"]);
        for k in &analysis.key_cards {
            keys.add_row(vec![
                k.card_name.clone(),
                k.current_level.to_string(),
                k.archetypes_unlocked.to_string(),
                format!("{:.1}", k.total_viability_gain),
                k.gold_cost.to_string(),
            ]);
        }
        out.push('\n');
        out.push_str(&keys.to_string());
    }
    out
}

pub fn render_impact_table(analysis: &UpgradeImpactAnalysis) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Rank",
        "Card",
        "Level",
        "Impact",
        "Decks",
        "Unlocks",
        "Gold",
        "Value/1k",
        "Key",
    ]);
    for (idx, i) in analysis.top_impacts.iter().enumerate() {
        let key = if i.is_key_card {
            Cell::new("YES").fg(Color::Green)
        } else {
            Cell::new("-")
        };
        table.add_row(Row::from(vec![
            Cell::new((idx + 1).to_string()),
            Cell::new(&i.card_name),
            Cell::new(format!("{} -> {}", i.current_level, i.upgraded_level)),
            Cell::new(format!("{:.2}", i.impact_score)),
            Cell::new(i.affected_decks.len().to_string()),
            Cell::new(i.unlock_potential.to_string()),
            Cell::new(i.gold_cost.to_string()),
            Cell::new(format!("{:.2}", i.value_per_gold)),
            key,
        ]));
    }

    let mut tree = new_table();
    tree.set_header(vec!["Archetype", "Status", "Score", "Upgrades Needed", "Gold"]);
    for node in &analysis.unlock_tree {
        let color = match node.status {
            UnlockStatus::Viable => Color::Green,
            UnlockStatus::Marginal => Color::Yellow,
            UnlockStatus::Blocked => Color::Red,
        };
        tree.add_row(Row::from(vec![
            Cell::new(&node.archetype),
            Cell::new(node.status.to_string().to_uppercase()).fg(color),
            Cell::new(format!("{:.3}", node.current_score)),
            Cell::new(node.upgrades_needed.join(", ")),
            Cell::new(node.estimated_gold.to_string()),
        ]));
    }

    let s = &analysis.summary;
    format!(
        "{}\n{}\nCards analyzed: {}  Key cards: {}  Avg impact: {:.2}  Max impact: {:.2}  Potential unlocks: {}",
        table,
        tree,
        s.total_cards_analyzed,
        s.key_cards_identified,
        s.avg_impact_score,
        s.max_impact_score,
        s.potential_unlocks
    )
}

pub fn render_priorities_table(priorities: &[UpgradePriority]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Card", "Rarity", "Level", "Progress", "Score", "Priority", "Reasons",
    ]);
    for p in priorities {
        let color = match p.priority {
            PriorityLevel::High => Color::Green,
            PriorityLevel::Medium => Color::Yellow,
            PriorityLevel::Low => Color::Grey,
        };
        table.add_row(Row::from(vec![
            Cell::new(&p.info.card_name),
            Cell::new(p.info.rarity.to_string()),
            Cell::new(format!("{}/{}", p.info.current_level, p.info.max_level)),
            Cell::new(format!(
                "{}/{} ({:.0}%)",
                p.info.cards_owned, p.info.cards_to_next_level, p.info.progress_percent
            )),
            Cell::new(format!("{:.1}", p.score)),
            Cell::new(format!("{:?}", p.priority).to_uppercase()).fg(color),
            Cell::new(p.reasons.join("; ")),
        ]));
    }
    table.to_string()
}

pub fn render_templates_table(store: &ArchetypeTemplateStore) -> String {
    let mut table = new_table();
    table.set_header(vec!["Archetype", "Category", "Win Condition", "Elixir", "Support"]);
    for t in store.templates() {
        table.add_row(vec![
            t.name.clone(),
            t.category.to_string(),
            t.win_condition.clone(),
            format!("{:.1}-{:.1}", t.min_elixir, t.max_elixir),
            t.support_cards.join(", "),
        ]);
    }
    format!(
        "{}\nVersion {} ({} templates, fingerprint {})",
        table,
        store.version(),
        store.len(),
        store.fingerprint()
    )
}
