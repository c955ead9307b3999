//! Candidate assignment: every case becomes a candidate for exactly one pattern.
//! Whether it is actually amputed is decided later by the response models.

use crate::error::ConfigurationError;
use ndarray::Array1;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

/// Label used for a case that is not a candidate for any pattern.
pub const NOT_AMPUTED: usize = 0;

/// Draws one 1-based pattern label per case, with replacement, with probabilities
/// equal to `frequencies`.
pub fn assign_candidates<R: Rng + ?Sized>(
    n_rows: usize,
    frequencies: &Array1<f64>,
    rng: &mut R,
) -> Result<Vec<usize>, ConfigurationError> {
    let sampler =
        WeightedIndex::new(frequencies.iter()).map_err(|_| ConfigurationError::ZeroFrequencySum)?;
    Ok((0..n_rows).map(|_| sampler.sample(rng) + 1).collect())
}

/// Row indices of the candidates of each pattern, in original row order.
pub fn candidates_by_pattern(assignment: &[usize], n_patterns: usize) -> Vec<Vec<usize>> {
    let mut groups = vec![Vec::new(); n_patterns];
    for (row, &label) in assignment.iter().enumerate() {
        if label != NOT_AMPUTED {
            groups[label - 1].push(row);
        }
    }
    groups
}

/// 1-based labels of patterns without a single candidate.
pub fn unused_patterns(groups: &[Vec<usize>]) -> Vec<usize> {
    groups
        .iter()
        .enumerate()
        .filter(|(_, rows)| rows.is_empty())
        .map(|(i, _)| i + 1)
        .collect()
}
