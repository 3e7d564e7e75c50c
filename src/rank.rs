//! Fuzzy candidate ranking.
//!
//! Invoked when exact resolution finds nothing, or for live-typing
//! suggestions. Every catalog entity is scored against the query with a
//! layered similarity function, filtered per entity type by that type's
//! threshold, and returned as ranked buckets. A single candidate that clears
//! the confidence bar with enough of a lead over the runner-up is promoted to
//! `unique_route` so the caller can navigate without showing choices.
//!
//! This is a pure function over the catalog; input debouncing and rendering
//! belong to the caller.

use crate::catalog::Catalog;
use crate::config::RankingConfig;
use crate::models::{Candidate, RankedCandidates};
use crate::normalize::norm_key;

/// Per-type bucket size limits.
#[derive(Debug, Clone, Copy)]
pub struct RankLimits {
    pub max_models: usize,
    pub max_parts: usize,
    pub max_schematics: usize,
}

impl From<&RankingConfig> for RankLimits {
    fn from(cfg: &RankingConfig) -> Self {
        Self {
            max_models: cfg.max_models,
            max_parts: cfg.max_parts,
            max_schematics: cfg.max_schematics,
        }
    }
}

/// Iterative single-row Levenshtein distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut row: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, &ac) in a_chars.iter().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        for (j, &bc) in b_chars.iter().enumerate() {
            let cost = usize::from(ac != bc);
            let cell = (prev + cost).min(row[j + 1] + 1).min(row[j] + 1);
            prev = row[j + 1];
            row[j + 1] = cell;
        }
    }
    row[b_chars.len()]
}

/// Edit-distance similarity in [0, 1]: 1 - distance / max(len).
fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Primary similarity score against an identifier field.
///
/// Structural matches (exact, prefix, substring) always outrank edit-distance
/// matches; the 0.85 dampening keeps even a one-character-off fuzzy hit below
/// a genuine substring hit of comparable length.
pub fn score(query: &str, candidate: &str) -> f64 {
    let q = norm_key(query);
    let c = norm_key(candidate);
    if q.is_empty() || c.is_empty() {
        return 0.0;
    }
    if q == c {
        return 1.0;
    }
    let ratio = q.chars().count() as f64 / c.chars().count() as f64;
    if c.starts_with(&q) {
        return 0.97 * ratio;
    }
    if c.contains(&q) {
        return 0.90 * ratio;
    }
    similarity(&q, &c) * 0.85
}

/// Looser scoring variant for free-text fields (names, descriptions).
pub fn score_loose(query: &str, text: &str) -> f64 {
    let q = norm_key(query);
    let t = norm_key(text);
    if q.is_empty() || t.is_empty() {
        return 0.0;
    }
    if t.contains(&q) {
        let ratio = q.chars().count() as f64 / t.chars().count() as f64;
        return 0.88 * ratio;
    }
    similarity(&q, &t) * 0.75
}

/// Secondary-field scores only matter when the identifier score is weak.
const LOOSE_BLEND_CUTOFF: f64 = 0.7;
/// Dampening applied when blending a loose score into a candidate score.
const LOOSE_BLEND_FACTOR: f64 = 0.9;

/// Score every entity, bucket the survivors per type, and decide whether one
/// candidate is confident enough to auto-resolve.
pub fn rank(
    catalog: &Catalog,
    query: &str,
    limits: RankLimits,
    cfg: &RankingConfig,
) -> RankedCandidates {
    if norm_key(query).is_empty() {
        return RankedCandidates::default();
    }

    let mut models = Vec::new();
    for model in catalog.models() {
        let s = score(query, &model.model_number).max(score(query, &model.id));
        if s >= cfg.model_threshold {
            models.push(Candidate {
                score: s,
                label: model.route_id().to_string(),
                sub: model.brand.clone(),
                route: model.route_id().to_string(),
            });
        }
    }

    let mut parts = Vec::new();
    for part in catalog.parts() {
        let primary = score(query, &part.id).max(score(query, &part.number));
        let s = if primary < LOOSE_BLEND_CUTOFF {
            let loose = score_loose(query, &part.name)
                .max(score_loose(query, &part.description))
                * LOOSE_BLEND_FACTOR;
            primary.max(loose)
        } else {
            primary
        };
        if s >= cfg.part_threshold {
            let route = if part.id.is_empty() {
                part.number.clone()
            } else {
                part.id.clone()
            };
            parts.push(Candidate {
                score: s,
                label: part.number.clone(),
                sub: part.name.clone(),
                route,
            });
        }
    }

    let mut schematics = Vec::new();
    for schematic in catalog.schematics() {
        let s = score(query, &schematic.name).max(score(query, &schematic.id));
        if s >= cfg.schematic_threshold {
            schematics.push(Candidate {
                score: s,
                label: schematic.name.clone(),
                sub: schematic.model_id.clone(),
                route: schematic.id.clone(),
            });
        }
    }

    sort_and_truncate(&mut models, limits.max_models);
    sort_and_truncate(&mut parts, limits.max_parts);
    sort_and_truncate(&mut schematics, limits.max_schematics);

    let unique_route = pick_unique(
        models.iter().chain(&parts).chain(&schematics),
        cfg.unique_score,
        cfg.unique_gap,
    );

    RankedCandidates {
        models,
        parts,
        schematics,
        unique_route,
    }
}

/// Stable descending sort, so equal scores keep catalog iteration order and
/// repeated calls return identical orderings.
fn sort_and_truncate(candidates: &mut Vec<Candidate>, limit: usize) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(limit);
}

/// The confidence-gap heuristic: auto-resolve only when the best candidate
/// across all buckets clears `unique_score` and leads the global runner-up
/// by at least `unique_gap`.
fn pick_unique<'a, I>(candidates: I, unique_score: f64, unique_gap: f64) -> Option<String>
where
    I: IntoIterator<Item = &'a Candidate>,
{
    let mut best: Option<&Candidate> = None;
    let mut second_score = f64::NEG_INFINITY;
    for candidate in candidates {
        match best {
            Some(b) if candidate.score > b.score => {
                second_score = b.score;
                best = Some(candidate);
            }
            Some(_) => second_score = second_score.max(candidate.score),
            None => best = Some(candidate),
        }
    }

    let best = best?;
    if best.score < unique_score {
        return None;
    }
    if second_score.is_finite() && best.score - second_score < unique_gap {
        return None;
    }
    Some(best.route.clone())
}
