use crate::mouse_gestures::db::GestureRecord;
use crate::mouse_gestures::pattern::{direction_difference, Pattern, Vector2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchingAlgorithm {
    /// Length-weighted direction comparison, see [`similarity`].
    #[default]
    Proportional,
    /// Compare four-way direction letters, for gestures recorded by older versions.
    LegacyLetters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Proportional,
    ExactLetters,
    ApproximateLetters,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureMatch<'a> {
    pub record: &'a GestureRecord,
    pub difference: f64,
    pub kind: MatchKind,
}

/// Shape difference between two patterns in `[0, 1]`, `0` meaning identical.
///
/// Both patterns are laid out over the unit interval with every vector taking
/// a share proportional to its length. The absolute direction difference of
/// every pair of overlapping vectors is weighted by the length of the overlap.
/// The result ignores the absolute size of either pattern.
pub fn similarity(a: &Pattern, b: &Pattern) -> f64 {
    let a = a.vectors();
    let b = b.vectors();
    let total_a: f64 = a.iter().map(|vector| vector.magnitude()).sum();
    let total_b: f64 = b.iter().map(|vector| vector.magnitude()).sum();
    debug_assert!(total_a > 0.0 && total_b > 0.0, "degenerate pattern");

    let mut total_difference = 0.0;
    let (mut idx_a, mut idx_b) = (0, 0);
    let (mut start_a, mut start_b) = (0.0_f64, 0.0_f64);

    while idx_a < a.len() && idx_b < b.len() {
        let vector_a = a[idx_a];
        let vector_b = b[idx_b];
        let end_a = start_a + vector_a.magnitude() / total_a;
        let end_b = start_b + vector_b.magnitude() / total_b;

        let overlap = (end_a.min(end_b) - start_a.max(start_b)).max(0.0);
        total_difference += direction_difference(vector_a, vector_b).abs() * overlap;

        if end_a < end_b {
            idx_a += 1;
            start_a = end_a;
        } else if end_a > end_b {
            idx_b += 1;
            start_b = end_b;
        } else {
            idx_a += 1;
            idx_b += 1;
            start_a = end_a;
            start_b = end_b;
        }
    }

    total_difference.clamp(0.0, 1.0)
}

/// Best candidate for `query`, or `None` when nothing is close enough.
pub fn best_match<'a>(
    query: &Pattern,
    candidates: &'a [GestureRecord],
    tolerance: f64,
    algorithm: MatchingAlgorithm,
) -> Option<GestureMatch<'a>> {
    match algorithm {
        MatchingAlgorithm::Proportional => best_proportional_match(query, candidates, tolerance),
        MatchingAlgorithm::LegacyLetters => best_letter_match(query, candidates),
    }
}

/// Record of the best match, see [`best_match`].
pub fn closest_gesture<'a>(
    query: &Pattern,
    candidates: &'a [GestureRecord],
    tolerance: f64,
    algorithm: MatchingAlgorithm,
) -> Option<&'a GestureRecord> {
    best_match(query, candidates, tolerance, algorithm).map(|found| found.record)
}

/// Up to `limit` candidates ordered by ascending difference.
pub fn rank_candidates<'a>(
    query: &Pattern,
    candidates: &'a [GestureRecord],
    limit: usize,
) -> Vec<GestureMatch<'a>> {
    let mut ranked: Vec<GestureMatch<'a>> = candidates
        .iter()
        .map(|record| GestureMatch {
            record,
            difference: similarity(query, &record.pattern),
            kind: MatchKind::Proportional,
        })
        .collect();
    ranked.sort_by(|a, b| a.difference.total_cmp(&b.difference));
    ranked.truncate(limit);
    ranked
}

fn best_proportional_match<'a>(
    query: &Pattern,
    candidates: &'a [GestureRecord],
    tolerance: f64,
) -> Option<GestureMatch<'a>> {
    let mut best: Option<GestureMatch<'a>> = None;
    for record in candidates {
        let difference = similarity(query, &record.pattern);
        // strict comparison keeps the first of equal candidates
        if best.map_or(true, |found| difference < found.difference) {
            best = Some(GestureMatch {
                record,
                difference,
                kind: MatchKind::Proportional,
            });
        }
    }
    best.filter(|found| found.difference <= tolerance)
}

fn best_letter_match<'a>(
    query: &Pattern,
    candidates: &'a [GestureRecord],
) -> Option<GestureMatch<'a>> {
    let letters = letter_sequence(query);
    if letters.is_empty() {
        return None;
    }
    let exact = candidates
        .iter()
        .find(|record| letter_sequence(&record.pattern) == letters)
        .map(|record| GestureMatch {
            record,
            difference: 0.0,
            kind: MatchKind::ExactLetters,
        });
    if exact.is_some() {
        return exact;
    }

    let collapsed = collapse_runs(&letters);
    candidates
        .iter()
        .find(|record| collapse_runs(&letter_sequence(&record.pattern)) == collapsed)
        .map(|record| GestureMatch {
            record,
            difference: 0.0,
            kind: MatchKind::ApproximateLetters,
        })
}

/// Four-way direction letters of a pattern, one per non-zero vector.
pub fn letter_sequence(pattern: &Pattern) -> String {
    pattern
        .vectors()
        .iter()
        .filter_map(|vector| direction_letter(*vector))
        .collect()
}

fn direction_letter(vector: Vector2) -> Option<char> {
    if vector.is_zero() {
        return None;
    }
    if vector.dx.abs() >= vector.dy.abs() {
        Some(if vector.dx > 0.0 { 'R' } else { 'L' })
    } else {
        Some(if vector.dy > 0.0 { 'D' } else { 'U' })
    }
}

fn collapse_runs(letters: &str) -> String {
    let mut collapsed = String::with_capacity(letters.len());
    for letter in letters.chars() {
        if !collapsed.ends_with(letter) {
            collapsed.push(letter);
        }
    }
    collapsed
}
