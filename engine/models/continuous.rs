//! Logistic response model.
//!
//! With `m` the mean score and `b` a shift, the probability of amputation is
//! `σ(x - m + b)` for right-tailed missingness, `σ(-x + m + b)` for left-tailed,
//! `σ(-|x - m| + 0.75 + b)` for central and `σ(|x - m| - 0.75 + b)` for both tails.
//! The shift is chosen by bisection so that the mean probability over the pattern's
//! candidates equals the target proportion.

use crate::types::AmputationType;
use ndarray::{Array1, ArrayView1};

const INITIAL_BOUND: f64 = 8.0;
const MAX_BOUND: f64 = 1.0e4;
const MAX_BISECTIONS: usize = 200;
const SHIFT_TOLERANCE: f64 = 1e-12;

pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn curve(kind: AmputationType, centred: f64, shift: f64) -> f64 {
    match kind {
        AmputationType::Right => logistic(centred + shift),
        AmputationType::Left => logistic(-centred + shift),
        AmputationType::Mid => logistic(-centred.abs() + 0.75 + shift),
        AmputationType::Tail => logistic(centred.abs() - 0.75 + shift),
    }
}

fn mean_probability(centred: &Array1<f64>, kind: AmputationType, shift: f64) -> f64 {
    centred.iter().map(|&x| curve(kind, x, shift)).sum::<f64>() / centred.len() as f64
}

/// Finds the shift whose mean probability equals `target`. The mean probability
/// increases with the shift, so the search brackets the target and bisects.
fn solve_shift(centred: &Array1<f64>, kind: AmputationType, target: f64) -> f64 {
    let mut lower = -INITIAL_BOUND;
    let mut upper = INITIAL_BOUND;
    while mean_probability(centred, kind, lower) > target && lower > -MAX_BOUND {
        lower *= 2.0;
    }
    while mean_probability(centred, kind, upper) < target && upper < MAX_BOUND {
        upper *= 2.0;
    }
    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (lower + upper);
        if mean_probability(centred, kind, mid) < target {
            lower = mid;
        } else {
            upper = mid;
        }
        if upper - lower < SHIFT_TOLERANCE {
            break;
        }
    }
    0.5 * (lower + upper)
}

/// Amputation probabilities for the candidates of one pattern.
pub fn probabilities(scores: ArrayView1<f64>, kind: AmputationType, proportion: f64) -> Array1<f64> {
    let n = scores.len();
    if proportion <= 0.0 {
        return Array1::zeros(n);
    }
    if proportion >= 1.0 {
        return Array1::ones(n);
    }
    if n == 1 {
        return Array1::from_elem(1, proportion);
    }
    let mean = scores.sum() / n as f64;
    let centred = scores.mapv(|x| x - mean);
    let shift = solve_shift(&centred, kind, proportion);
    log::debug!("Logistic {kind} curve shifted by {shift:.6} for {n} candidates");
    centred.mapv(|x| curve(kind, x, shift))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    fn grid() -> Array1<f64> {
        Array1::linspace(-2.0, 2.0, 41)
    }

    #[test]
    fn mean_probability_hits_the_target() {
        for kind in [
            AmputationType::Left,
            AmputationType::Mid,
            AmputationType::Tail,
            AmputationType::Right,
        ] {
            for target in [0.05, 0.3, 0.5, 0.9] {
                let p = probabilities(grid().view(), kind, target);
                assert_relative_eq!(p.mean().unwrap(), target, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn right_and_left_are_mirrors() {
        let right = probabilities(grid().view(), AmputationType::Right, 0.4);
        let left = probabilities(grid().view(), AmputationType::Left, 0.4);
        assert!(right.windows(2).into_iter().all(|w| w[0] < w[1]));
        for (r, l) in right.iter().zip(left.iter().rev()) {
            assert_relative_eq!(*r, *l, epsilon = 1e-8);
        }
    }

    #[test]
    fn mid_peaks_at_the_centre_and_tail_at_the_extremes() {
        let mid = probabilities(grid().view(), AmputationType::Mid, 0.4);
        let tail = probabilities(grid().view(), AmputationType::Tail, 0.4);
        assert!(mid[20] > mid[0] && mid[20] > mid[40]);
        assert!(tail[20] < tail[0] && tail[20] < tail[40]);
    }

    #[test]
    fn degenerate_inputs() {
        let one = probabilities(Array1::from_elem(1, 3.0).view(), AmputationType::Right, 0.3);
        assert_eq!(one.to_vec(), vec![0.3]);
        let none = probabilities(grid().view(), AmputationType::Right, 0.0);
        assert!(none.iter().all(|&p| p == 0.0));
        let all = probabilities(grid().view(), AmputationType::Tail, 1.0);
        assert!(all.iter().all(|&p| p == 1.0));
        let constant = probabilities(Array1::from_elem(5, 2.0).view(), AmputationType::Mid, 0.2);
        for p in constant.iter() {
            assert_relative_eq!(*p, 0.2, epsilon = 1e-8);
        }
    }
}
