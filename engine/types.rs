// ========================================================================================
//                             High-Level Data Contracts
// ========================================================================================

// Types passed between the normalizer, the models and the pipeline. Module-local
// types live next to their module.

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::ConfigurationError;
use ndarray::{Array1, Array2};
use std::fmt;
use std::str::FromStr;

/// The assumed cause of the missingness that is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mechanism {
    /// Missing completely at random: independent of the data.
    Mcar,
    /// Missing at random: depends on the variables a pattern keeps observed.
    Mar,
    /// Missing not at random: depends on the variables a pattern makes missing.
    Mnar,
}

impl Mechanism {
    pub fn token(self) -> &'static str {
        match self {
            Self::Mcar => "MCAR",
            Self::Mar => "MAR",
            Self::Mnar => "MNAR",
        }
    }

    /// Whether sum scores are needed, i.e. whether missingness depends on values.
    pub fn uses_scores(self) -> bool {
        !matches!(self, Self::Mcar)
    }

    /// Parses a list of mechanism tokens. Only the first one is used; any extra
    /// tokens are dropped with a diagnostic.
    pub fn from_tokens<S: AsRef<str>>(
        tokens: &[S],
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, ConfigurationError> {
        let first = tokens.first().ok_or(ConfigurationError::MissingMechanism)?;
        let mechanism: Mechanism = first.as_ref().parse()?;
        if tokens.len() > 1 {
            diagnostics.push(Diagnostic::MultipleValues {
                argument: "mechanism",
                used: mechanism.token().to_string(),
            });
        }
        Ok(mechanism)
    }
}

impl FromStr for Mechanism {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MCAR" => Ok(Self::Mcar),
            "MAR" => Ok(Self::Mar),
            "MNAR" => Ok(Self::Mnar),
            _ => Err(ConfigurationError::UnknownMechanism(s.to_string())),
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Shape of the logistic missingness curve used by the continuous model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmputationType {
    /// Low sum scores are more likely to be amputed.
    Left,
    /// Scores near the centre are more likely to be amputed.
    Mid,
    /// Scores in both tails are more likely to be amputed.
    Tail,
    /// High sum scores are more likely to be amputed.
    Right,
}

impl AmputationType {
    pub fn token(self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Mid => "MID",
            Self::Tail => "TAIL",
            Self::Right => "RIGHT",
        }
    }
}

impl FromStr for AmputationType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LEFT" => Ok(Self::Left),
            "MID" => Ok(Self::Mid),
            "TAIL" => Ok(Self::Tail),
            "RIGHT" => Ok(Self::Right),
            _ => Err(ConfigurationError::UnknownType(s.to_string())),
        }
    }
}

impl fmt::Display for AmputationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Relative odds per pattern for the discrete model. Rows may be ragged; a `None`
/// cell marks an absent entry so that every row has the same width.
#[derive(Debug, Clone, PartialEq)]
pub struct OddsMatrix {
    cells: Array2<Option<f64>>,
}

impl OddsMatrix {
    pub fn new(cells: Array2<Option<f64>>) -> Self {
        Self { cells }
    }

    /// Builds a matrix from possibly ragged rows, padding short rows with absent cells.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let cells = Array2::from_shape_fn((rows.len(), width), |(i, j)| rows[i].get(j).copied());
        Self { cells }
    }

    /// The same odds row repeated for every pattern.
    pub fn repeated(row: &[f64], patterns: usize) -> Self {
        let rows = vec![row.to_vec(); patterns];
        Self::from_rows(&rows)
    }

    pub fn nrows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cells(&self) -> &Array2<Option<f64>> {
        &self.cells
    }

    /// Present (non-absent) odds of one pattern, in order.
    pub fn present(&self, pattern: usize) -> Vec<f64> {
        self.cells.row(pattern).iter().flatten().copied().collect()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.nrows()).map(|i| self.present(i)).collect()
    }

    pub(crate) fn select_rows(&self, keep: &[usize]) -> Self {
        Self {
            cells: self.cells.select(ndarray::Axis(0), keep),
        }
    }
}

/// Pattern input: either a matrix or a flat row-major vector that is reshaped
/// by dividing its length by the number of variables.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternInput {
    Matrix(Array2<f64>),
    Flat(Vec<f64>),
}

/// Weight input: either a matrix or a flat row-major vector.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightsInput {
    Matrix(Array2<f64>),
    Flat(Vec<f64>),
}

/// Odds input: a per-pattern matrix, or one odds row shared by every pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum OddsInput {
    Matrix(OddsMatrix),
    Shared(Vec<f64>),
}

/// Arguments of one amputation run. Unset optional inputs are filled from the
/// generators in [`crate::defaults`].
#[derive(Debug, Clone, PartialEq)]
pub struct AmputeOptions {
    /// Target proportion in `[0, 1]`, or a percentage in `(1, 100]`.
    pub proportion: f64,
    pub patterns: Option<PatternInput>,
    pub frequencies: Option<Vec<f64>>,
    pub mechanism: Mechanism,
    pub weights: Option<WeightsInput>,
    /// Standardize each variable over a pattern's candidates before scoring.
    pub standardize: bool,
    /// Use the logistic model when true, the odds model when false.
    pub continuous: bool,
    pub types: Option<Vec<AmputationType>>,
    pub odds: Option<OddsInput>,
    /// Proportion counts incomplete cases when true, missing cells when false.
    pub by_cases: bool,
    /// When false only the configuration is resolved.
    pub run: bool,
}

impl Default for AmputeOptions {
    fn default() -> Self {
        Self {
            proportion: 0.5,
            patterns: None,
            frequencies: None,
            mechanism: Mechanism::Mar,
            weights: None,
            standardize: true,
            continuous: true,
            types: None,
            odds: None,
            by_cases: true,
            run: true,
        }
    }
}

impl AmputeOptions {
    pub fn with_proportion(mut self, proportion: f64) -> Self {
        self.proportion = proportion;
        self
    }

    pub fn with_patterns(mut self, patterns: Array2<f64>) -> Self {
        self.patterns = Some(PatternInput::Matrix(patterns));
        self
    }

    pub fn with_frequencies(mut self, frequencies: Vec<f64>) -> Self {
        self.frequencies = Some(frequencies);
        self
    }

    pub fn with_mechanism(mut self, mechanism: Mechanism) -> Self {
        self.mechanism = mechanism;
        self
    }

    pub fn with_weights(mut self, weights: Array2<f64>) -> Self {
        self.weights = Some(WeightsInput::Matrix(weights));
        self
    }

    pub fn with_types(mut self, types: Vec<AmputationType>) -> Self {
        self.types = Some(types);
        self
    }

    pub fn with_odds(mut self, odds: OddsMatrix) -> Self {
        self.odds = Some(OddsInput::Matrix(odds));
        self
    }

    pub fn discrete(mut self) -> Self {
        self.continuous = false;
        self
    }

    pub fn by_cells(mut self) -> Self {
        self.by_cases = false;
        self
    }

    pub fn without_standardization(mut self) -> Self {
        self.standardize = false;
        self
    }

    pub fn configuration_only(mut self) -> Self {
        self.run = false;
        self
    }
}

/// The normalized configuration of a run. Nothing in it is mutated after
/// normalization. The proportion is always expressed as a fraction of cases.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Binary patterns x variables matrix; 0 marks a variable made missing.
    pub patterns: Array2<u8>,
    /// Sums to one, one entry per pattern.
    pub frequencies: Array1<f64>,
    pub weights: Array2<f64>,
    pub mechanism: Mechanism,
    pub types: Vec<AmputationType>,
    pub odds: OddsMatrix,
    pub proportion: f64,
    pub standardize: bool,
    pub continuous: bool,
}

impl ResolvedConfig {
    pub fn n_patterns(&self) -> usize {
        self.patterns.nrows()
    }

    pub fn n_variables(&self) -> usize {
        self.patterns.ncols()
    }

    /// Indices of the variables that pattern `pattern` makes missing.
    pub fn amputed_variables(&self, pattern: usize) -> Vec<usize> {
        self.patterns
            .row(pattern)
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 0)
            .map(|(j, _)| j)
            .collect()
    }

    /// Options that reproduce this configuration when fed back into a run.
    /// Inputs the mechanism or model would discard are left unset.
    pub fn to_options(&self) -> AmputeOptions {
        let uses_scores = self.mechanism.uses_scores();
        AmputeOptions {
            proportion: self.proportion,
            patterns: Some(PatternInput::Matrix(self.patterns.mapv(f64::from))),
            frequencies: Some(self.frequencies.to_vec()),
            mechanism: self.mechanism,
            weights: uses_scores.then(|| WeightsInput::Matrix(self.weights.clone())),
            standardize: self.standardize,
            continuous: self.continuous,
            types: (uses_scores && self.continuous).then(|| self.types.clone()),
            odds: (uses_scores && !self.continuous)
                .then(|| OddsInput::Matrix(self.odds.clone())),
            by_cases: true,
            run: true,
        }
    }
}
