//! # Delimited Table I/O
//!
//! Reads complete data tables into a [`Dataset`] and writes amputed tables back out.
//! Files ending in `.csv` are comma separated; everything else is read as TSV.
//! Missing cells are written as `NA`, and `NA` or empty cells are read as missing
//! so that an amputed table can be inspected with the same loader.
//!
//! Column types follow what Polars infers: string columns stay text (their labels
//! are preserved on output), every other type is cast to `f64`.

use crate::data::{Column, ColumnValues, Dataset};
use crate::error::DataError;
use polars::prelude::{
    Column as FrameColumn, CsvParseOptions, CsvReadOptions, CsvReader, CsvWriter, DataFrame,
    DataType, NamedFrom, NullValues, PolarsError, SerReader, SerWriter, Series,
};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

pub const MISSING_TOKEN: &str = "NA";

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Error from the underlying Polars DataFrame library: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Error writing delimited output: {0}")]
    CsvError(#[from] csv::Error),
    #[error(
        "Column '{column_name}' could not be converted to numbers. (Found type: {found_type})"
    )]
    ColumnWrongType {
        column_name: String,
        found_type: String,
    },
    #[error("The table is not usable: {0}")]
    Data(#[from] DataError),
}

/// Field separator chosen from the file extension.
pub fn separator_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => b'\t',
    }
}

/// Loads a delimited table with a header row.
pub fn load_table(path: &Path) -> Result<Dataset, TableError> {
    log::info!("Loading data from '{}'", path.display());
    let df = CsvReader::new(File::open(path)?)
        .with_options(
            CsvReadOptions::default().with_has_header(true).with_parse_options(
                CsvParseOptions::default()
                    .with_separator(separator_for(path))
                    .with_null_values(Some(NullValues::AllColumnsSingle(
                        MISSING_TOKEN.into(),
                    ))),
            ),
        )
        .finish()?;
    let dataset = dataset_from_frame(&df)?;
    log::info!(
        "Loaded {} rows and {} columns ({} text)",
        dataset.nrows(),
        dataset.ncols(),
        dataset.columns().iter().filter(|c| !c.is_numeric()).count()
    );
    Ok(dataset)
}

fn dataset_from_frame(df: &DataFrame) -> Result<Dataset, TableError> {
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let name = column.name().to_string();
        let values = if column.dtype() == &DataType::String {
            ColumnValues::Text(
                column
                    .str()?
                    .into_iter()
                    .map(|v| v.map(str::to_string))
                    .collect(),
            )
        } else {
            let casted = column
                .cast(&DataType::Float64)
                .map_err(|_| TableError::ColumnWrongType {
                    column_name: name.clone(),
                    found_type: format!("{:?}", column.dtype()),
                })?;
            ColumnValues::Numeric(casted.f64()?.into_iter().collect())
        };
        columns.push(Column { name, values });
    }
    Ok(Dataset::new(columns)?)
}

fn frame_from_dataset(data: &Dataset) -> Result<DataFrame, TableError> {
    let columns: Vec<FrameColumn> = data
        .columns()
        .iter()
        .map(|column| {
            let series = match &column.values {
                ColumnValues::Numeric(v) => Series::new(column.name.as_str().into(), v),
                ColumnValues::Text(v) => Series::new(column.name.as_str().into(), v),
            };
            FrameColumn::from(series)
        })
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Writes a table with a header row, marking missing cells with `NA`.
pub fn write_table(data: &Dataset, path: &Path) -> Result<(), TableError> {
    let mut df = frame_from_dataset(data)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(separator_for(path))
        .with_null_value(MISSING_TOKEN.to_string())
        .finish(&mut df)?;
    log::info!("Wrote amputed data to '{}'", path.display());
    Ok(())
}

/// Writes the 1-based pattern label of every row. Label 0 marks a row that was
/// never assigned to a pattern.
pub fn write_assignments(candidates: &[usize], path: &Path) -> Result<(), TableError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .delimiter(separator_for(path))
        .from_path(path)?;
    wtr.write_record(["row", "pattern"])?;
    for (i, label) in candidates.iter().enumerate() {
        wtr.write_record([(i + 1).to_string(), label.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}
