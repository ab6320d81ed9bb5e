use std::collections::HashSet;

use crate::engine::edit_distance::{distance_by, word_distance};
use crate::engine::timing;
use crate::error::Result;

/// Whether an entered token counts as a recall of `target`.
pub fn is_hit(token: &str, target: &str, typo_tolerance: usize) -> bool {
    word_distance(token, target) <= typo_tolerance
}

/// Number of presented targets the participant recalled.
///
/// Every entered token is compared with every presented target; a target is
/// hit when some token lies within `typo_tolerance` edits of it. Hits keep
/// entry order and each target is counted once. With `heed_order` the hit
/// sequence is aligned against the presented sequence and every edit in that
/// alignment costs one point.
///
/// Hits are drawn from `presented`, so there are never more distinct hits than
/// presented targets and the order penalty cannot exceed `presented.len()`.
pub fn score<E, P>(entered: &[E], presented: &[P], typo_tolerance: usize, heed_order: bool) -> usize
where
    E: AsRef<str>,
    P: AsRef<str>,
{
    let mut hits: Vec<&str> = Vec::new();
    for token in entered {
        for target in presented {
            if is_hit(token.as_ref(), target.as_ref(), typo_tolerance) {
                hits.push(target.as_ref());
            }
        }
    }

    let mut seen = HashSet::new();
    hits.retain(|hit| seen.insert(*hit));

    if heed_order {
        let targets: Vec<&str> = presented.iter().map(AsRef::as_ref).collect();
        let misses = distance_by(&hits, &targets, |a, b| is_hit(a, b, typo_tolerance));
        targets.len().saturating_sub(misses)
    } else {
        hits.len()
    }
}

/// Splits a typed recall entry into tokens.
///
/// Entries are lowercased and commas act as separators. When every target of
/// the run is a single character, each non-blank character is its own token so
/// participants may type letters without spaces.
pub fn tokenize_recall(entry: &str, single_letters: bool) -> Vec<String> {
    let normalized = entry.to_lowercase().replace(',', " ");
    if single_letters {
        normalized
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(String::from)
            .collect()
    } else {
        normalized.split_whitespace().map(str::to_string).collect()
    }
}

/// Partial credit unit: the mean of the per-list recall proportions.
pub fn partial_credit_unit(proportions: &[f64]) -> Result<f64> {
    timing::mean(proportions)
}
