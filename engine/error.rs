use thiserror::Error;

/// Failures caused by a malformed amputation configuration. All of these are raised
/// while normalizing the inputs, before any random number is drawn.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error(
        "Proportion of missingness should be a value between 0 and 1 (for a proportion) or between 1 and 100 (for a percentage), got {0}."
    )]
    ProportionOutOfRange(f64),

    #[error("The pattern matrix is empty. At least one pattern is required.")]
    EmptyPatterns,

    #[error(
        "Patterns may only contain 0 (variable made missing) or 1 (variable observed). Found {value} in pattern {pattern}, variable {variable}."
    )]
    NonBinaryPattern {
        pattern: usize,
        variable: usize,
        value: f64,
    },

    #[error(
        "A pattern vector of length {length} cannot be reshaped into rows of {variables} variables."
    )]
    PatternLengthMismatch { length: usize, variables: usize },

    #[error(
        "Patterns describe {found} variables but the data has {expected} columns. The length of a pattern must match the number of variables."
    )]
    PatternWidthMismatch { found: usize, expected: usize },

    #[error(
        "One pattern with merely ones results in no amputation at all, the procedure is therefore stopped."
    )]
    SingleAllOnesPattern,

    #[error(
        "Pattern {pattern} contains merely zeros, which is not possible when the mechanism is MAR: no observed variable is left to condition on."
    )]
    AllZeroPatternUnderMar { pattern: usize },

    #[error("Frequencies must be finite and non-negative, found {value} at position {index}.")]
    InvalidFrequency { index: usize, value: f64 },

    #[error("Frequencies sum to zero, so no pattern could ever be assigned.")]
    ZeroFrequencySum,

    #[error(
        "The weights ({rows} x {cols}) do not match the patterns ({patterns} x {variables})."
    )]
    WeightsShapeMismatch {
        rows: usize,
        cols: usize,
        patterns: usize,
        variables: usize,
    },

    #[error("A weight vector of length {length} cannot be reshaped into rows of {variables} variables.")]
    WeightsLengthMismatch { length: usize, variables: usize },

    #[error("Weights must be finite, found {value} in pattern {pattern}, variable {variable}.")]
    NonFiniteWeight {
        pattern: usize,
        variable: usize,
        value: f64,
    },

    #[error("The odds matrix has {rows} rows but there are {patterns} patterns.")]
    OddsShapeMismatch { rows: usize, patterns: usize },

    #[error("Odds can only contain non-negative values, found {value} for pattern {pattern}.")]
    NegativeOdds { pattern: usize, value: f64 },

    #[error("Odds for pattern {pattern} contain no positive value, so no quantile group can be amputed.")]
    DegenerateOdds { pattern: usize },

    #[error("Mechanism should be one of MCAR, MAR or MNAR, got '{0}'.")]
    UnknownMechanism(String),

    #[error("No mechanism was supplied.")]
    MissingMechanism,

    #[error("Type should be one of LEFT, MID, TAIL or RIGHT, got '{0}'.")]
    UnknownType(String),

    #[error("The type vector has length {found}; it should have length 1 or {patterns}.")]
    TypeLengthMismatch { found: usize, patterns: usize },
}

/// Failures caused by the dataset handed to the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("No data was supplied: the dataset has no columns.")]
    Empty,

    #[error("The dataset has no rows.")]
    NoRows,

    #[error("Data should contain at least two columns, found {0}.")]
    TooFewColumns(usize),

    #[error("Column '{column}' has {found} values but the dataset has {expected} rows.")]
    RaggedColumns {
        column: String,
        found: usize,
        expected: usize,
    },

    #[error(
        "Data cannot contain missing values. Column '{column}' has a missing value in row {row}."
    )]
    ContainsMissing { column: String, row: usize },
}

/// The umbrella error returned by [`crate::pipeline::amputate`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmputeError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(
        "Proportion of missing cells is too large in combination with the desired patterns: it requires {requested_cases:.2} incomplete cases but the data has only {rows} rows."
    )]
    InfeasibleProportion { requested_cases: f64, rows: usize },
}
