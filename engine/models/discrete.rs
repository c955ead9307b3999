//! Odds response model.
//!
//! The candidates of a pattern are split into as many score quantile groups as the
//! pattern has odds values. Group `j` with `n_j` cases and odds `o_j` is amputed
//! with probability `p_j = min(1, c * o_j)`, where the scale `c` is solved so that
//! the expected number of amputed cases, `sum_j n_j * p_j`, equals
//! `proportion * n`. With equal group sizes and no clipping this is
//! `p_j = g * proportion * o_j / sum(o)` for `g` groups.

use ndarray::{Array1, ArrayView1};

/// Type-7 sample quantile of already sorted values.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

/// 0-based quantile group of every score. A score on a cut point belongs to the
/// upper group.
pub fn quantile_groups(scores: ArrayView1<f64>, n_groups: usize) -> Vec<usize> {
    if scores.is_empty() || n_groups == 0 {
        return vec![0; scores.len()];
    }
    let mut sorted = scores.to_vec();
    sorted.sort_by(f64::total_cmp);
    let cuts: Vec<f64> = (1..n_groups)
        .map(|k| quantile(&sorted, k as f64 / n_groups as f64))
        .collect();
    scores
        .iter()
        .map(|&x| cuts.iter().take_while(|&&cut| x >= cut).count())
        .collect()
}

/// Per-group probabilities for groups of `sizes` cases with relative `odds`.
pub fn calibrate(sizes: &[usize], odds: &[f64], proportion: f64) -> Vec<f64> {
    let total: usize = sizes.iter().sum();
    let target = proportion.clamp(0.0, 1.0) * total as f64;
    let mut saturated = vec![false; odds.len()];
    let mut scale = 0.0;
    for _ in 0..=odds.len() {
        let fixed: f64 = sizes
            .iter()
            .zip(&saturated)
            .filter(|&(_, &s)| s)
            .map(|(&n, _)| n as f64)
            .sum();
        let weight: f64 = sizes
            .iter()
            .zip(odds)
            .zip(&saturated)
            .filter(|&(_, &s)| !s)
            .map(|((&n, &o), _)| n as f64 * o)
            .sum();
        scale = if weight > 0.0 {
            ((target - fixed) / weight).max(0.0)
        } else {
            0.0
        };
        let mut changed = false;
        for (j, (&n, &o)) in sizes.iter().zip(odds).enumerate() {
            if !saturated[j] && n > 0 && scale * o > 1.0 {
                saturated[j] = true;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    odds.iter()
        .zip(&saturated)
        .map(|(&o, &s)| if s { 1.0 } else { (scale * o).clamp(0.0, 1.0) })
        .collect()
}

/// Amputation probabilities for the candidates of one pattern.
pub fn probabilities(scores: ArrayView1<f64>, odds: &[f64], proportion: f64) -> Array1<f64> {
    let n = scores.len();
    if n == 1 {
        return Array1::from_elem(1, proportion.clamp(0.0, 1.0));
    }
    let groups = quantile_groups(scores, odds.len());
    let mut sizes = vec![0usize; odds.len()];
    for &g in &groups {
        sizes[g] += 1;
    }
    let per_group = calibrate(&sizes, odds, proportion);
    log::debug!("Odds groups of sizes {sizes:?} amputed with probabilities {per_group:?}");
    groups.iter().map(|&g| per_group[g]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    #[test]
    fn quantile_groups_split_evenly() {
        let scores = Array1::linspace(1.0, 8.0, 8);
        assert_eq!(
            quantile_groups(scores.view(), 4),
            vec![0, 0, 1, 1, 2, 2, 3, 3]
        );
    }

    #[test]
    fn equal_groups_reduce_to_the_closed_form() {
        let odds = [1.0, 2.0, 3.0, 4.0];
        let probs = calibrate(&[25, 25, 25, 25], &odds, 0.3);
        for (p, o) in probs.iter().zip(odds) {
            assert_relative_eq!(*p, 4.0 * 0.3 * o / 10.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn clipped_groups_pass_their_mass_on() {
        let probs = calibrate(&[10, 10], &[1.0, 9.0], 0.6);
        assert_relative_eq!(probs[0], 0.2, epsilon = 1e-12);
        assert_relative_eq!(probs[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn expected_amputations_match_the_target() {
        let sizes = [7, 13, 0, 30];
        let odds = [0.5, 4.0, 2.0, 1.0];
        for target in [0.1, 0.4, 0.75] {
            let probs = calibrate(&sizes, &odds, target);
            let expected: f64 = sizes.iter().zip(&probs).map(|(&n, p)| n as f64 * p).sum();
            assert_relative_eq!(expected, target * 50.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn zero_odds_groups_are_never_amputed() {
        let probs = calibrate(&[10, 10], &[0.0, 1.0], 0.9);
        assert_eq!(probs, vec![0.0, 1.0]);
    }

    #[test]
    fn higher_scores_get_higher_odds() {
        let scores = Array1::linspace(-1.0, 1.0, 100);
        let p = probabilities(scores.view(), &[1.0, 2.0, 3.0, 4.0], 0.25);
        assert!(p[0] < p[99]);
        assert_relative_eq!(p.mean().unwrap(), 0.25, epsilon = 1e-9);
    }
}
