// ========================================================================================
//
//                           The Amputation Pipeline
//
// ========================================================================================
//
// normalize -> assign candidates -> score (skipped for MCAR) -> response model -> inject.
//
// Every validation happens before the first random draw, so a failed call has
// consumed nothing from the caller's generator and can be retried as is.

use crate::assemble::inject_missing;
use crate::assign::{self, NOT_AMPUTED};
use crate::data::Dataset;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::AmputeError;
use crate::models::ResponseModel;
use crate::normalize;
use crate::scores;
use crate::types::{AmputeOptions, ResolvedConfig};
use ndarray::{Array1, Array2};
use rand::Rng;

/// Everything produced by one amputation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AmputationResult {
    /// The resolved configuration, echoing normalized arguments and defaults.
    pub config: ResolvedConfig,
    /// 1-based pattern label per case, in row order. All [`NOT_AMPUTED`] when the
    /// run only resolved the configuration.
    pub candidates: Vec<usize>,
    /// Sum scores of each pattern's candidates. Empty for MCAR and for
    /// configuration-only runs.
    pub scores: Vec<Array1<f64>>,
    /// The original data with missing markers injected.
    pub amputed: Dataset,
    /// The numeric data used for scoring.
    pub numeric: Array2<f64>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AmputationResult {
    /// Fraction of rows that received at least one missing value.
    pub fn incomplete_case_fraction(&self) -> f64 {
        self.amputed.count_incomplete_rows() as f64 / self.amputed.nrows() as f64
    }

    /// Fraction of all cells that are missing.
    pub fn missing_cell_fraction(&self) -> f64 {
        let cells = self.amputed.nrows() * self.amputed.ncols();
        self.amputed.count_missing_cells() as f64 / cells as f64
    }
}

/// Generates missing values in `data` according to `options`, drawing every random
/// number from `rng`.
pub fn amputate<R: Rng + ?Sized>(
    data: &Dataset,
    options: &AmputeOptions,
    rng: &mut R,
) -> Result<AmputationResult, AmputeError> {
    let mut diagnostics = Diagnostics::new();
    data.validate_complete()?;
    let n_rows = data.nrows();

    let config = normalize::resolve_config(options, (n_rows, data.ncols()), &mut diagnostics)?;
    let numeric = data.to_numeric();
    if config.mechanism.uses_scores() && !numeric.coerced.is_empty() {
        diagnostics.push(Diagnostic::DataCoerced {
            columns: numeric.coerced.clone(),
        });
    }
    log::info!(
        "Resolved {} pattern(s) under {} with a case proportion of {:.4}",
        config.n_patterns(),
        config.mechanism,
        config.proportion
    );

    if !options.run {
        return Ok(AmputationResult {
            config,
            candidates: vec![NOT_AMPUTED; n_rows],
            scores: Vec::new(),
            amputed: data.clone(),
            numeric: numeric.matrix,
            diagnostics: diagnostics.into_vec(),
        });
    }

    let candidates = assign::assign_candidates(n_rows, &config.frequencies, rng)?;
    let groups = assign::candidates_by_pattern(&candidates, config.n_patterns());
    let unused = assign::unused_patterns(&groups);
    if !unused.is_empty() {
        diagnostics.push(Diagnostic::UnusedPatterns { patterns: unused });
    }
    log::debug!(
        "Candidates per pattern: {:?}",
        groups.iter().map(Vec::len).collect::<Vec<_>>()
    );

    let scores = if config.mechanism.uses_scores() {
        scores::sum_scores(&numeric.matrix, &groups, &config.weights, config.standardize)
    } else {
        Vec::new()
    };

    let responses =
        ResponseModel::for_config(&config).respond(&groups, &scores, config.proportion, rng);
    let amputed = inject_missing(data, &config, &groups, &responses);
    log::info!(
        "Amputed {} of {} rows ({} cells)",
        amputed.count_incomplete_rows(),
        n_rows,
        amputed.count_missing_cells()
    );

    Ok(AmputationResult {
        config,
        candidates,
        scores,
        amputed,
        numeric: numeric.matrix,
        diagnostics: diagnostics.into_vec(),
    })
}

/// Convenience wrapper for a purely numeric matrix.
pub fn amputate_matrix<R: Rng + ?Sized>(
    data: &Array2<f64>,
    options: &AmputeOptions,
    rng: &mut R,
) -> Result<AmputationResult, AmputeError> {
    amputate(&Dataset::from_matrix(data), options, rng)
}
