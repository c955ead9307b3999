//! Writes missing markers onto the original data.

use crate::data::Dataset;
use crate::types::ResolvedConfig;

/// Copies `original` and, for every pattern, blanks the variables the pattern
/// amputes in each candidate whose response indicator is `false`. Rows keep their
/// original order and representation.
pub fn inject_missing(
    original: &Dataset,
    config: &ResolvedConfig,
    groups: &[Vec<usize>],
    responses: &[Vec<bool>],
) -> Dataset {
    let mut amputed = original.clone();
    for (pattern, (rows, observed)) in groups.iter().zip(responses).enumerate() {
        let variables = config.amputed_variables(pattern);
        for (&row, &keep) in rows.iter().zip(observed) {
            if keep {
                continue;
            }
            for &col in &variables {
                amputed.set_missing(row, col);
            }
        }
    }
    amputed
}
