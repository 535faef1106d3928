use std::collections::BTreeMap;

use crate::scoring::{CardCandidate, Role};
use crate::types::Rarity;

/// Highest score first; equal scores fall back to name order.
pub fn sort_by_score(candidates: &mut [CardCandidate]) {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
}

pub fn filter_by_min_score(candidates: &[CardCandidate], min_score: f64) -> Vec<CardCandidate> {
    candidates
        .iter()
        .filter(|c| c.score >= min_score)
        .cloned()
        .collect()
}

pub fn top_n(candidates: &[CardCandidate], n: usize) -> Vec<CardCandidate> {
    let mut sorted = candidates.to_vec();
    sort_by_score(&mut sorted);
    sorted.truncate(n);
    sorted
}

pub fn filter_by_role(candidates: &[CardCandidate], role: Role) -> Vec<CardCandidate> {
    candidates
        .iter()
        .filter(|c| c.role == role)
        .cloned()
        .collect()
}

pub fn filter_by_elixir_range(
    candidates: &[CardCandidate],
    min_elixir: u32,
    max_elixir: u32,
) -> Vec<CardCandidate> {
    candidates
        .iter()
        .filter(|c| c.elixir >= min_elixir && c.elixir <= max_elixir)
        .cloned()
        .collect()
}

pub fn exclude_cards(candidates: &[CardCandidate], excluded: &[String]) -> Vec<CardCandidate> {
    candidates
        .iter()
        .filter(|c| !excluded.iter().any(|name| name == &c.name))
        .cloned()
        .collect()
}

pub fn average_elixir(candidates: &[CardCandidate]) -> f64 {
    if candidates.is_empty() {
        return 0.0;
    }
    let total: u32 = candidates.iter().map(|c| c.elixir).sum();
    f64::from(total) / candidates.len() as f64
}

/// Counts per level-ratio decile (0 = below 10%, 10 = maxed).
pub fn level_distribution(candidates: &[CardCandidate]) -> BTreeMap<u32, usize> {
    let mut out = BTreeMap::new();
    for c in candidates {
        let bucket = (c.level_ratio() * 10.0).floor().clamp(0.0, 10.0) as u32;
        *out.entry(bucket).or_insert(0) += 1;
    }
    out
}

pub fn rarity_distribution(candidates: &[CardCandidate]) -> BTreeMap<Rarity, usize> {
    let mut out = BTreeMap::new();
    for c in candidates {
        *out.entry(c.rarity).or_insert(0) += 1;
    }
    out
}
