//! Non-fatal diagnostics raised while resolving and running an amputation.
//!
//! Every diagnostic is logged at `warn` level the moment it is recorded and is
//! also kept, so callers can inspect what the engine adjusted on their behalf.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// An argument received several values; only the first one is used.
    MultipleValues {
        argument: &'static str,
        used: String,
    },
    /// A proportion above 1 was read as a percentage.
    PercentageProportion { supplied: f64, used: f64 },
    /// The frequency vector was truncated or padded to the number of patterns.
    FrequencyLengthAdjusted {
        supplied: usize,
        patterns: usize,
        adjusted: Vec<f64>,
    },
    /// The frequency vector did not sum to one and was divided by its sum.
    FrequencyRenormalized { sum: f64 },
    /// Patterns consisting of ones only were removed.
    AllOnesPatternsDropped {
        patterns: Vec<usize>,
        old_proportion: f64,
        new_proportion: f64,
    },
    /// A pattern makes every variable missing.
    AllZeroPattern { pattern: usize },
    /// Weights were supplied but the mechanism does not use them.
    WeightsIgnored,
    /// Odds were supplied but are not used.
    OddsIgnored { reason: &'static str },
    /// Types were supplied but are not used.
    TypeIgnored { reason: &'static str },
    /// Non-numeric columns were converted to numbers for scoring.
    DataCoerced { columns: Vec<String> },
    /// Patterns that received no candidate cases and therefore amputed nothing.
    UnusedPatterns { patterns: Vec<usize> },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultipleValues { argument, used } => write!(
                f,
                "Several values were given for {argument}; only the first one ({used}) is used"
            ),
            Self::PercentageProportion { supplied, used } => write!(
                f,
                "Proportion {supplied} is read as a percentage and changed to {used}"
            ),
            Self::FrequencyLengthAdjusted {
                supplied,
                patterns,
                adjusted,
            } => write!(
                f,
                "Length of the frequency vector ({supplied}) does not match #patterns ({patterns}) and is therefore changed to {adjusted:?}"
            ),
            Self::FrequencyRenormalized { sum } => write!(
                f,
                "Frequencies sum to {sum} instead of 1 and are therefore rescaled"
            ),
            Self::AllOnesPatternsDropped {
                patterns,
                old_proportion,
                new_proportion,
            } => write!(
                f,
                "Patterns {patterns:?} contain merely ones and are removed; the proportion of missingness changes from {old_proportion} to {new_proportion}"
            ),
            Self::AllZeroPattern { pattern } => write!(
                f,
                "Pattern {pattern} makes every variable missing"
            ),
            Self::WeightsIgnored => f.write_str("Weights are not used when the mechanism is MCAR"),
            Self::OddsIgnored { reason } => write!(f, "Odds are not used {reason}"),
            Self::TypeIgnored { reason } => write!(f, "Type is not used {reason}"),
            Self::DataCoerced { columns } => write!(
                f,
                "Columns {columns:?} are made numeric because the calculation of sum scores requires numeric data"
            ),
            Self::UnusedPatterns { patterns } => write!(
                f,
                "No cases were assigned to patterns {patterns:?}; they produce no missing values"
            ),
        }
    }
}

/// Collector for diagnostics of a single run.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
