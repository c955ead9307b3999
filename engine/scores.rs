//! # Sum Score Engine
//!
//! For every pattern, each candidate case gets a weighted sum of its variables.
//! With standardization the variables are centred and scaled over the pattern's own
//! candidates first, so only the ratios between weights matter. The resulting score
//! vector is itself rescaled to zero mean and unit variance whenever it is not
//! constant. Patterns are independent and are scored in parallel.

use ndarray::{Array1, Array2, ArrayView1, ArrayViewMut1, Axis};
use rayon::prelude::*;

/// Scores every pattern. Patterns without candidates get the placeholder `[0.0]`,
/// which keeps shapes uniform and is never read as a real score.
pub fn sum_scores(
    data: &Array2<f64>,
    groups: &[Vec<usize>],
    weights: &Array2<f64>,
    standardize: bool,
) -> Vec<Array1<f64>> {
    groups
        .par_iter()
        .enumerate()
        .map(|(i, rows)| pattern_scores(data, rows, weights.row(i), standardize))
        .collect()
}

/// Scores of the candidate rows `rows` of a single pattern.
pub fn pattern_scores(
    data: &Array2<f64>,
    rows: &[usize],
    weights: ArrayView1<f64>,
    standardize: bool,
) -> Array1<f64> {
    if rows.is_empty() {
        return Array1::zeros(1);
    }
    let mut candidates = data.select(Axis(0), rows);
    if standardize && rows.len() > 1 && candidates.columns().into_iter().any(|c| !is_constant(c)) {
        for column in candidates.columns_mut() {
            standardize_in_place(column);
        }
    }
    let mut scores = candidates.dot(&weights);
    if !is_constant(scores.view()) {
        standardize_in_place(scores.view_mut());
    }
    scores
}

fn is_constant(values: ArrayView1<f64>) -> bool {
    values.iter().all(|&v| v == values[0])
}

/// Centres to zero mean and scales to unit sample standard deviation. A constant
/// input is only centred.
pub fn standardize_in_place(mut values: ArrayViewMut1<f64>) {
    let n = values.len();
    if n == 0 {
        return;
    }
    let mean = values.sum() / n as f64;
    values.mapv_inplace(|v| v - mean);
    if n < 2 {
        return;
    }
    let sd = (values.iter().map(|v| v * v).sum::<f64>() / (n - 1) as f64).sqrt();
    if sd > 0.0 && sd.is_finite() {
        values.mapv_inplace(|v| v / sd);
    }
}
