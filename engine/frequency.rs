//! Frequency normalization and proportion resolution.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{AmputeError, ConfigurationError};
use ndarray::{Array1, Array2};

/// Value used to pad a frequency vector that is shorter than the pattern count.
pub const FREQUENCY_FILLER: f64 = 0.2;

/// Frequencies whose sum is this close to one are left untouched.
const SUM_TOLERANCE: f64 = 1e-9;

/// Validates the requested proportion. Values in `(1, 100]` are percentages.
pub fn resolve_proportion(
    proportion: f64,
    diagnostics: &mut Diagnostics,
) -> Result<f64, ConfigurationError> {
    if !proportion.is_finite() || !(0.0..=100.0).contains(&proportion) {
        return Err(ConfigurationError::ProportionOutOfRange(proportion));
    }
    if proportion > 1.0 {
        let used = proportion / 100.0;
        diagnostics.push(Diagnostic::PercentageProportion {
            supplied: proportion,
            used,
        });
        return Ok(used);
    }
    Ok(proportion)
}

/// Truncates or pads `frequencies` to exactly `n_patterns` entries.
pub fn reconcile_length(
    mut frequencies: Vec<f64>,
    n_patterns: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<f64> {
    let supplied = frequencies.len();
    if supplied == n_patterns {
        return frequencies;
    }
    frequencies.resize(n_patterns, FREQUENCY_FILLER);
    diagnostics.push(Diagnostic::FrequencyLengthAdjusted {
        supplied,
        patterns: n_patterns,
        adjusted: frequencies.clone(),
    });
    frequencies
}

/// Divides a non-negative frequency vector by its sum.
pub fn normalize(
    frequencies: &[f64],
    diagnostics: &mut Diagnostics,
) -> Result<Array1<f64>, ConfigurationError> {
    if let Some((index, &value)) = frequencies
        .iter()
        .enumerate()
        .find(|&(_, &f)| !f.is_finite() || f < 0.0)
    {
        return Err(ConfigurationError::InvalidFrequency {
            index: index + 1,
            value,
        });
    }
    let sum: f64 = frequencies.iter().sum();
    if sum <= 0.0 {
        return Err(ConfigurationError::ZeroFrequencySum);
    }
    let frequencies = Array1::from_vec(frequencies.to_vec());
    if (sum - 1.0).abs() <= SUM_TOLERANCE {
        return Ok(frequencies);
    }
    diagnostics.push(Diagnostic::FrequencyRenormalized { sum });
    Ok(frequencies / sum)
}

/// Converts a proportion of missing cells into the equivalent proportion of
/// incomplete cases.
///
/// The desired number of missing cells is `proportion * rows * columns`. Pattern
/// `i` receives `frequencies[i]` of those cells, and every case it amputes loses
/// as many cells as the pattern has zeros, which gives the number of cases the
/// pattern needs. The case proportion is the total over patterns divided by the
/// number of rows; more cases than rows cannot be realized.
pub fn cells_to_cases(
    proportion: f64,
    patterns: &Array2<u8>,
    frequencies: &Array1<f64>,
    n_rows: usize,
) -> Result<f64, AmputeError> {
    let desired_cells = proportion * n_rows as f64 * patterns.ncols() as f64;
    let requested_cases: f64 = patterns
        .rows()
        .into_iter()
        .zip(frequencies.iter())
        .map(|(pattern, &freq)| {
            let zeros = pattern.iter().filter(|&&v| v == 0).count();
            desired_cells * freq / zeros as f64
        })
        .sum();
    if requested_cases > n_rows as f64 + SUM_TOLERANCE {
        return Err(AmputeError::InfeasibleProportion {
            requested_cases,
            rows: n_rows,
        });
    }
    Ok((requested_cases / n_rows as f64).min(1.0))
}
