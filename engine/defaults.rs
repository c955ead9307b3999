//! Default generators for every optional amputation input. Each is keyed on the
//! normalized pattern matrix, so defaults always have the right shape.

use crate::types::{AmputationType, Mechanism, OddsMatrix};
use ndarray::{Array1, Array2};

/// Relative odds used by the discrete model when none are supplied.
pub const DEFAULT_ODDS: [f64; 4] = [1.0, 2.0, 3.0, 4.0];

/// One pattern per variable, each making exactly that variable missing.
pub fn patterns(n_variables: usize) -> Array2<u8> {
    Array2::from_shape_fn((n_variables, n_variables), |(i, j)| u8::from(i != j))
}

/// Equal frequency for every pattern.
pub fn frequencies(n_patterns: usize) -> Array1<f64> {
    Array1::from_elem(n_patterns, 1.0 / n_patterns as f64)
}

/// Under MAR the observed variables get weight one; under MNAR the amputed ones do.
/// MCAR never scores, so its weights are all zero.
pub fn weights(patterns: &Array2<u8>, mechanism: Mechanism) -> Array2<f64> {
    match mechanism {
        Mechanism::Mcar => Array2::zeros(patterns.raw_dim()),
        Mechanism::Mar => patterns.mapv(f64::from),
        Mechanism::Mnar => patterns.mapv(|v| f64::from(1 - v)),
    }
}

pub fn types(n_patterns: usize) -> Vec<AmputationType> {
    vec![AmputationType::Right; n_patterns]
}

pub fn odds(n_patterns: usize) -> OddsMatrix {
    OddsMatrix::repeated(&DEFAULT_ODDS, n_patterns)
}
