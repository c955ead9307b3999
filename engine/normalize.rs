//! # Configuration Normalizer
//!
//! Turns raw amputation arguments into a [`ResolvedConfig`]: patterns are reshaped
//! and checked to be binary, patterns of only ones are dropped (their frequency mass
//! is taken out of the proportion), and weights, odds and types are reconciled with
//! the surviving patterns or generated from defaults. Everything here is
//! deterministic; no random number is drawn until normalization has succeeded.

use crate::defaults;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{AmputeError, ConfigurationError};
use crate::frequency;
use crate::types::{
    AmputationType, AmputeOptions, Mechanism, OddsInput, OddsMatrix, PatternInput,
    ResolvedConfig, WeightsInput,
};
use ndarray::{Array2, Axis};

/// Which rows of the supplied patterns survive normalization. Configuration inputs
/// given per original pattern are reduced with the same rows.
struct RowSelection {
    original: usize,
    kept: Vec<usize>,
}

impl RowSelection {
    fn reduced(&self) -> usize {
        self.kept.len()
    }

    fn is_reduced(&self) -> bool {
        self.original != self.kept.len()
    }
}

/// Resolves the full configuration for data of shape `(n_rows, n_variables)`.
pub fn resolve_config(
    options: &AmputeOptions,
    (n_rows, n_variables): (usize, usize),
    diagnostics: &mut Diagnostics,
) -> Result<ResolvedConfig, AmputeError> {
    let mechanism = options.mechanism;
    let mut proportion = frequency::resolve_proportion(options.proportion, diagnostics)?;

    let raw_patterns = match &options.patterns {
        Some(input) => binary_patterns(input, n_variables)?,
        None => defaults::patterns(n_variables),
    };

    let raw_frequencies = match &options.frequencies {
        Some(f) => frequency::reconcile_length(f.clone(), raw_patterns.nrows(), diagnostics),
        None => defaults::frequencies(raw_patterns.nrows()).to_vec(),
    };
    let raw_frequencies = frequency::normalize(&raw_frequencies, diagnostics)?;

    let selection = drop_all_ones(&raw_patterns)?;
    let patterns = raw_patterns.select(Axis(0), &selection.kept);
    let frequencies = if selection.is_reduced() {
        let dropped: Vec<usize> = (0..selection.original)
            .filter(|i| !selection.kept.contains(i))
            .collect();
        let dropped_mass: f64 = dropped.iter().map(|&i| raw_frequencies[i]).sum();
        let new_proportion = (1.0 - dropped_mass) * proportion;
        diagnostics.push(Diagnostic::AllOnesPatternsDropped {
            patterns: dropped.iter().map(|i| i + 1).collect(),
            old_proportion: proportion,
            new_proportion,
        });
        proportion = new_proportion;
        let kept = raw_frequencies.select(Axis(0), &selection.kept);
        let sum = kept.sum();
        if sum <= 0.0 {
            return Err(ConfigurationError::ZeroFrequencySum.into());
        }
        kept / sum
    } else {
        raw_frequencies
    };

    for (i, row) in patterns.rows().into_iter().enumerate() {
        if row.iter().all(|&v| v == 0) {
            if mechanism == Mechanism::Mar {
                return Err(ConfigurationError::AllZeroPatternUnderMar { pattern: i + 1 }.into());
            }
            diagnostics.push(Diagnostic::AllZeroPattern { pattern: i + 1 });
        }
    }

    let weights = resolve_weights(options, &patterns, &selection, diagnostics)?;
    let types = resolve_types(options, &selection, diagnostics)?;
    let odds = resolve_odds(options, &selection, diagnostics)?;

    if !options.by_cases {
        proportion = frequency::cells_to_cases(proportion, &patterns, &frequencies, n_rows)?;
        log::info!("Cell-based proportion converted to a case proportion of {proportion:.4}");
    }

    Ok(ResolvedConfig {
        patterns,
        frequencies,
        weights,
        mechanism,
        types,
        odds,
        proportion,
        standardize: options.standardize,
        continuous: options.continuous,
    })
}

/// Reshapes and validates the pattern input into a binary matrix.
fn binary_patterns(
    input: &PatternInput,
    n_variables: usize,
) -> Result<Array2<u8>, ConfigurationError> {
    let matrix = match input {
        PatternInput::Matrix(m) => m.clone(),
        PatternInput::Flat(values) => reshape_rows(values, n_variables).ok_or(
            ConfigurationError::PatternLengthMismatch {
                length: values.len(),
                variables: n_variables,
            },
        )?,
    };
    if matrix.nrows() == 0 {
        return Err(ConfigurationError::EmptyPatterns);
    }
    if matrix.ncols() != n_variables {
        return Err(ConfigurationError::PatternWidthMismatch {
            found: matrix.ncols(),
            expected: n_variables,
        });
    }
    if let Some(((pattern, variable), &value)) = matrix
        .indexed_iter()
        .find(|&(_, &v)| v != 0.0 && v != 1.0)
    {
        return Err(ConfigurationError::NonBinaryPattern {
            pattern: pattern + 1,
            variable: variable + 1,
            value,
        });
    }
    Ok(matrix.mapv(|v| u8::from(v == 1.0)))
}

/// Row-major reshape of a flat vector into rows of `width` values.
fn reshape_rows(values: &[f64], width: usize) -> Option<Array2<f64>> {
    if width == 0 || values.is_empty() || values.len() % width != 0 {
        return None;
    }
    Array2::from_shape_vec((values.len() / width, width), values.to_vec()).ok()
}

fn drop_all_ones(patterns: &Array2<u8>) -> Result<RowSelection, ConfigurationError> {
    let kept: Vec<usize> = patterns
        .rows()
        .into_iter()
        .enumerate()
        .filter(|(_, row)| row.iter().any(|&v| v == 0))
        .map(|(i, _)| i)
        .collect();
    if kept.is_empty() {
        return Err(ConfigurationError::SingleAllOnesPattern);
    }
    Ok(RowSelection {
        original: patterns.nrows(),
        kept,
    })
}

fn resolve_weights(
    options: &AmputeOptions,
    patterns: &Array2<u8>,
    selection: &RowSelection,
    diagnostics: &mut Diagnostics,
) -> Result<Array2<f64>, ConfigurationError> {
    let Some(input) = &options.weights else {
        return Ok(defaults::weights(patterns, options.mechanism));
    };
    if !options.mechanism.uses_scores() {
        diagnostics.push(Diagnostic::WeightsIgnored);
        return Ok(defaults::weights(patterns, options.mechanism));
    }

    let n_variables = patterns.ncols();
    let matrix = match input {
        WeightsInput::Matrix(m) => m.clone(),
        WeightsInput::Flat(values) => reshape_rows(values, n_variables).ok_or(
            ConfigurationError::WeightsLengthMismatch {
                length: values.len(),
                variables: n_variables,
            },
        )?,
    };
    let mismatch = ConfigurationError::WeightsShapeMismatch {
        rows: matrix.nrows(),
        cols: matrix.ncols(),
        patterns: selection.reduced(),
        variables: n_variables,
    };
    if matrix.ncols() != n_variables {
        return Err(mismatch);
    }
    let weights = if matrix.nrows() == selection.reduced() {
        matrix
    } else if matrix.nrows() == selection.original {
        matrix.select(Axis(0), &selection.kept)
    } else {
        return Err(mismatch);
    };
    if let Some(((pattern, variable), &value)) =
        weights.indexed_iter().find(|&(_, v)| !v.is_finite())
    {
        return Err(ConfigurationError::NonFiniteWeight {
            pattern: pattern + 1,
            variable: variable + 1,
            value,
        });
    }
    Ok(weights)
}

fn resolve_types(
    options: &AmputeOptions,
    selection: &RowSelection,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<AmputationType>, ConfigurationError> {
    let Some(types) = &options.types else {
        return Ok(defaults::types(selection.reduced()));
    };
    if !options.mechanism.uses_scores() {
        diagnostics.push(Diagnostic::TypeIgnored {
            reason: "when the mechanism is MCAR",
        });
        return Ok(defaults::types(selection.reduced()));
    }
    if !options.continuous {
        diagnostics.push(Diagnostic::TypeIgnored {
            reason: "when the model is discrete",
        });
        return Ok(defaults::types(selection.reduced()));
    }
    match types.len() {
        1 => Ok(vec![types[0]; selection.reduced()]),
        n if n == selection.reduced() => Ok(types.clone()),
        n if n == selection.original => Ok(selection.kept.iter().map(|&i| types[i]).collect()),
        n => Err(ConfigurationError::TypeLengthMismatch {
            found: n,
            patterns: selection.reduced(),
        }),
    }
}

fn resolve_odds(
    options: &AmputeOptions,
    selection: &RowSelection,
    diagnostics: &mut Diagnostics,
) -> Result<OddsMatrix, ConfigurationError> {
    let Some(input) = &options.odds else {
        return Ok(defaults::odds(selection.reduced()));
    };
    if !options.mechanism.uses_scores() {
        diagnostics.push(Diagnostic::OddsIgnored {
            reason: "when the mechanism is MCAR",
        });
        return Ok(defaults::odds(selection.reduced()));
    }
    if options.continuous {
        diagnostics.push(Diagnostic::OddsIgnored {
            reason: "by the continuous model",
        });
        return Ok(defaults::odds(selection.reduced()));
    }

    let odds = match input {
        OddsInput::Shared(row) => OddsMatrix::repeated(row, selection.reduced()),
        OddsInput::Matrix(m) if m.nrows() == selection.reduced() => m.clone(),
        OddsInput::Matrix(m) if m.nrows() == selection.original => {
            m.select_rows(&selection.kept)
        }
        OddsInput::Matrix(m) => {
            return Err(ConfigurationError::OddsShapeMismatch {
                rows: m.nrows(),
                patterns: selection.reduced(),
            });
        }
    };
    for pattern in 0..odds.nrows() {
        let present = odds.present(pattern);
        if let Some(&value) = present.iter().find(|&&v| v.is_nan() || v < 0.0) {
            return Err(ConfigurationError::NegativeOdds {
                pattern: pattern + 1,
                value,
            });
        }
        if !present.iter().any(|&v| v > 0.0) {
            return Err(ConfigurationError::DegenerateOdds {
                pattern: pattern + 1,
            });
        }
    }
    Ok(odds)
}
