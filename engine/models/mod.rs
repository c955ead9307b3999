//! Missingness probability models. Each turns the scores of a pattern's candidates
//! into response indicators: `true` keeps a case observed, `false` amputes it.

pub mod continuous;
pub mod discrete;

use crate::types::{AmputationType, Mechanism, OddsMatrix, ResolvedConfig};
use ndarray::Array1;
use rand::Rng;

/// The model used for a run. Resolved once from the configuration so the per-case
/// loops never re-inspect mechanism or continuity.
#[derive(Debug, Clone, Copy)]
pub enum ResponseModel<'a> {
    /// Missingness independent of the data.
    Random,
    /// Logistic curves shaped per pattern.
    Logistic(&'a [AmputationType]),
    /// Quantile groups with relative odds per pattern.
    Odds(&'a OddsMatrix),
}

impl<'a> ResponseModel<'a> {
    pub fn for_config(config: &'a ResolvedConfig) -> Self {
        match (config.mechanism, config.continuous) {
            (Mechanism::Mcar, _) => Self::Random,
            (_, true) => Self::Logistic(&config.types),
            (_, false) => Self::Odds(&config.odds),
        }
    }

    /// Response indicators for every pattern. `groups[i]` are the candidate rows of
    /// pattern `i`; `scores[i]` their sum scores (unused by the random model).
    /// Patterns without candidates yield an empty indicator vector.
    pub fn respond<R: Rng + ?Sized>(
        &self,
        groups: &[Vec<usize>],
        scores: &[Array1<f64>],
        proportion: f64,
        rng: &mut R,
    ) -> Vec<Vec<bool>> {
        groups
            .iter()
            .enumerate()
            .map(|(i, rows)| {
                if rows.is_empty() {
                    return Vec::new();
                }
                let probabilities = match self {
                    Self::Random => Array1::from_elem(rows.len(), proportion),
                    Self::Logistic(types) => {
                        continuous::probabilities(scores[i].view(), types[i], proportion)
                    }
                    Self::Odds(odds) => {
                        discrete::probabilities(scores[i].view(), &odds.present(i), proportion)
                    }
                };
                draw(&probabilities, rng)
            })
            .collect()
    }
}

/// Independent weighted coin flips; a case is amputed with its probability.
pub fn draw<R: Rng + ?Sized>(probabilities: &Array1<f64>, rng: &mut R) -> Vec<bool> {
    probabilities
        .iter()
        .map(|&p| rng.r#gen::<f64>() >= p.clamp(0.0, 1.0))
        .collect()
}
