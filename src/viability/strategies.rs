use crate::archetype::ArchetypeTemplate;
use crate::providers::{Strategy, StrategyProfile, StrategyProvider};
use crate::viability::StrategyRecommendation;

const MIN_COMPATIBILITY: f64 = 40.0;
const AFFINITY_WEIGHT: f64 = 0.7;
const ELIXIR_FIT_WEIGHT: f64 = 0.3;

/// 0..100 average affinity of the template's cards for a strategy.
pub fn card_affinity(profile: &StrategyProfile, template: &ArchetypeTemplate) -> f64 {
    if profile.archetype_affinity.is_empty() {
        return 50.0;
    }
    let matches: Vec<f64> = template
        .all_cards()
        .into_iter()
        .filter_map(|card| profile.archetype_affinity.get(card).copied())
        .collect();
    if matches.is_empty() {
        return 30.0;
    }
    let mean = matches.iter().sum::<f64>() / matches.len() as f64;
    (mean * 100.0).min(100.0)
}

/// 0..100 fit of an average elixir against the strategy's target band.
pub fn elixir_fit(profile: &StrategyProfile, average_elixir: f64) -> f64 {
    if average_elixir <= 0.0 {
        return 50.0;
    }
    let (min, max) = (profile.target_elixir_min, profile.target_elixir_max);
    if average_elixir >= min && average_elixir <= max {
        let half_range = (max - min) / 2.0;
        let centeredness = if half_range > 0.0 {
            1.0 - (average_elixir - (min + max) / 2.0).abs() / half_range
        } else {
            1.0
        };
        return 80.0 + centeredness * 20.0;
    }
    let distance = if average_elixir < min {
        min - average_elixir
    } else {
        average_elixir - max
    };
    (80.0 - distance * 30.0).max(20.0)
}

fn compatibility_label(score: f64) -> &'static str {
    if score >= 85.0 {
        "Excellent match"
    } else if score >= 70.0 {
        "Strong compatibility"
    } else if score >= 55.0 {
        "Good fit"
    } else {
        "Moderate compatibility"
    }
}

fn reason(
    strategy: Strategy,
    profile: &StrategyProfile,
    template: &ArchetypeTemplate,
    compatibility: f64,
) -> String {
    let mut text = compatibility_label(compatibility).to_string();
    if profile
        .archetype_affinity
        .contains_key(&template.win_condition)
    {
        text.push_str(&format!(
            ": {} naturally fits {strategy} strategy",
            template.win_condition
        ));
    }
    let midpoint = template.elixir_midpoint();
    if midpoint >= profile.target_elixir_min && midpoint <= profile.target_elixir_max {
        text.push_str(&format!(" ({midpoint:.1} elixir matches target range)"));
    }
    text
}

pub fn recommend_strategies(
    provider: &dyn StrategyProvider,
    template: &ArchetypeTemplate,
    average_elixir: f64,
) -> Vec<StrategyRecommendation> {
    let mut out: Vec<StrategyRecommendation> = provider
        .strategies()
        .into_iter()
        .filter_map(|strategy| {
            let profile = provider.profile(strategy)?;
            let affinity = card_affinity(&profile, template);
            let fit = elixir_fit(&profile, average_elixir);
            let compatibility = AFFINITY_WEIGHT * affinity + ELIXIR_FIT_WEIGHT * fit;
            if compatibility < MIN_COMPATIBILITY {
                return None;
            }
            Some(StrategyRecommendation {
                strategy,
                compatibility_score: compatibility,
                archetype_affinity: affinity,
                elixir_fit: fit,
                reason: reason(strategy, &profile, template, compatibility),
            })
        })
        .collect();
    out.sort_by(|a, b| {
        b.compatibility_score
            .total_cmp(&a.compatibility_score)
            .then_with(|| a.strategy.cmp(&b.strategy))
    });
    out
}
