//! Human-readable TOML persistence of a resolved configuration.
//!
//! A saved configuration can be fed back into a later run, where it is normalized
//! again against the new data. Loading therefore only checks that the tokens parse;
//! shape checks happen when the options meet the data.

use crate::error::ConfigurationError;
use crate::types::{
    AmputationType, AmputeOptions, Mechanism, OddsInput, OddsMatrix, PatternInput, ResolvedConfig,
    WeightsInput,
};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("Failed to read or write configuration file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML configuration file: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Failed to serialize configuration to TOML format: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
    #[error("The configuration file is not valid: {0}")]
    Invalid(#[from] ConfigurationError),
    #[error("Row {row} of '{field}' has {found} entries, but row 1 has {expected}.")]
    RaggedMatrix {
        field: &'static str,
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// On-disk form of a [`ResolvedConfig`]. Matrices are stored as lists of rows and
/// enumerations by their upper-case tokens. The proportion always counts cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub proportion: f64,
    pub mechanism: String,
    pub standardize: bool,
    pub continuous: bool,
    pub patterns: Vec<Vec<u8>>,
    pub frequencies: Vec<f64>,
    pub weights: Vec<Vec<f64>>,
    pub types: Vec<String>,
    /// Ragged rows: each pattern may have its own number of odds groups.
    pub odds: Vec<Vec<f64>>,
}

fn rows_of<T: Clone>(matrix: &Array2<T>) -> Vec<Vec<T>> {
    matrix.rows().into_iter().map(|row| row.to_vec()).collect()
}

fn matrix_of(field: &'static str, rows: &[Vec<f64>]) -> Result<Array2<f64>, ConfigFileError> {
    let width = rows.first().map_or(0, Vec::len);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(ConfigFileError::RaggedMatrix {
                field,
                row: i + 1,
                found: row.len(),
                expected: width,
            });
        }
    }
    Ok(Array2::from_shape_fn((rows.len(), width), |(i, j)| rows[i][j]))
}

impl ConfigFile {
    pub fn from_resolved(config: &ResolvedConfig) -> Self {
        Self {
            proportion: config.proportion,
            mechanism: config.mechanism.token().to_string(),
            standardize: config.standardize,
            continuous: config.continuous,
            patterns: rows_of(&config.patterns),
            frequencies: config.frequencies.to_vec(),
            weights: rows_of(&config.weights),
            types: config.types.iter().map(|t| t.token().to_string()).collect(),
            odds: config.odds.to_rows(),
        }
    }

    /// Options that reproduce the saved configuration. Inputs the saved mechanism or
    /// model would discard are left unset, mirroring [`ResolvedConfig::to_options`].
    pub fn to_options(&self) -> Result<AmputeOptions, ConfigFileError> {
        let mechanism: Mechanism = self.mechanism.parse()?;
        let types = self
            .types
            .iter()
            .map(|t| t.parse::<AmputationType>())
            .collect::<Result<Vec<_>, _>>()?;
        let patterns: Vec<Vec<f64>> = self
            .patterns
            .iter()
            .map(|row| row.iter().map(|&v| f64::from(v)).collect())
            .collect();
        let uses_scores = mechanism.uses_scores();
        let weights = if uses_scores {
            Some(WeightsInput::Matrix(matrix_of("weights", &self.weights)?))
        } else {
            None
        };
        Ok(AmputeOptions {
            proportion: self.proportion,
            patterns: Some(PatternInput::Matrix(matrix_of("patterns", &patterns)?)),
            frequencies: Some(self.frequencies.clone()),
            mechanism,
            weights,
            standardize: self.standardize,
            continuous: self.continuous,
            types: (uses_scores && self.continuous).then_some(types),
            odds: (uses_scores && !self.continuous)
                .then(|| OddsInput::Matrix(OddsMatrix::from_rows(&self.odds))),
            by_cases: true,
            run: true,
        })
    }

    /// Saves the configuration to a file in a human-readable TOML format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigFileError> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut file = BufWriter::new(fs::File::create(path)?);
        file.write_all(toml_string.as_bytes())?;
        Ok(())
    }

    /// Loads a configuration from a TOML file, checking that its tokens parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let toml_string = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&toml_string)?;
        config.to_options()?;
        Ok(config)
    }
}
