#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]
pub mod assemble;
pub mod assign;
pub mod config;
pub mod data;
pub mod defaults;
pub mod diagnostics;
pub mod error;
pub mod frequency;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod scores;
#[path = "../shared/tables.rs"]
pub mod tables;
pub mod types;

pub use config::{ConfigFile, ConfigFileError};
pub use data::{Column, ColumnValues, Dataset};
pub use diagnostics::Diagnostic;
pub use error::{AmputeError, ConfigurationError, DataError};
pub use pipeline::{AmputationResult, amputate, amputate_matrix};
pub use types::{
    AmputationType, AmputeOptions, Mechanism, OddsInput, OddsMatrix, PatternInput,
    ResolvedConfig, WeightsInput,
};
