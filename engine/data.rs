//! # Dataset Representation and Coercion
//!
//! The engine keeps the caller's data in its original representation so that
//! missing markers can be written back onto it: a column of labels stays a column
//! of labels. Scoring is linear algebra, so a numeric copy of the data is derived
//! by coercing every column to `f64`.
//!
//! - Numeric columns are used as-is.
//! - Text columns whose every value parses as a number are parsed.
//! - Remaining text columns become factor codes `1..L`, with levels ordered by
//!   natural sort order.

use crate::error::DataError;
use ahash::AHashMap;
use ndarray::Array2;

/// Values of one column. `None` is the missing marker; a non-finite number is
/// also treated as missing.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Numeric(values.into_iter().map(Some).collect()),
        }
    }

    pub fn text<S: Into<String>>(name: impl Into<String>, values: Vec<S>) -> Self {
        Self {
            name: name.into(),
            values: ColumnValues::Text(values.into_iter().map(|v| Some(v.into())).collect()),
        }
    }

    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.values, ColumnValues::Numeric(_))
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match &self.values {
            ColumnValues::Numeric(v) => v[row].is_none_or(|x| !x.is_finite()),
            ColumnValues::Text(v) => v[row].is_none(),
        }
    }

    fn set_missing(&mut self, row: usize) {
        match &mut self.values {
            ColumnValues::Numeric(v) => v[row] = None,
            ColumnValues::Text(v) => v[row] = None,
        }
    }

    fn coerce(&self) -> Vec<f64> {
        match &self.values {
            ColumnValues::Numeric(v) => v.iter().map(|x| x.unwrap_or(f64::NAN)).collect(),
            ColumnValues::Text(v) => {
                let parsed: Option<Vec<f64>> = v
                    .iter()
                    .map(|x| x.as_deref().and_then(|s| s.trim().parse::<f64>().ok()))
                    .collect();
                match parsed {
                    Some(values) if values.iter().all(|x| x.is_finite()) => values,
                    _ => factor_codes(v),
                }
            }
        }
    }
}

fn factor_codes(values: &[Option<String>]) -> Vec<f64> {
    let mut levels: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
    levels.sort_by(|a, b| natord::compare(a, b));
    levels.dedup();
    let codes: AHashMap<&str, f64> = levels
        .iter()
        .enumerate()
        .map(|(i, level)| (*level, (i + 1) as f64))
        .collect();
    values
        .iter()
        .map(|v| {
            v.as_deref()
                .and_then(|s| codes.get(s).copied())
                .unwrap_or(f64::NAN)
        })
        .collect()
}

/// Numeric view of a dataset, together with the names of the columns that had to
/// be converted from text.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericData {
    pub matrix: Array2<f64>,
    pub coerced: Vec<String>,
}

/// A rectangular table of named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self, DataError> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(DataError::RaggedColumns {
                    column: bad.name.clone(),
                    found: bad.len(),
                    expected,
                });
            }
        }
        Ok(Self { columns })
    }

    /// Wraps a numeric matrix, naming the columns `V1`, `V2`, ...
    pub fn from_matrix(matrix: &Array2<f64>) -> Self {
        let columns = matrix
            .columns()
            .into_iter()
            .enumerate()
            .map(|(j, col)| Column::numeric(format!("V{}", j + 1), col.to_vec()))
            .collect();
        Self { columns }
    }

    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Checks that the data can be amputed: at least two columns, at least one row,
    /// and no missing values anywhere.
    pub fn validate_complete(&self) -> Result<(), DataError> {
        if self.columns.is_empty() {
            return Err(DataError::Empty);
        }
        if self.ncols() < 2 {
            return Err(DataError::TooFewColumns(self.ncols()));
        }
        if self.nrows() == 0 {
            return Err(DataError::NoRows);
        }
        for column in &self.columns {
            if let Some(row) = (0..column.len()).find(|&r| column.is_missing(r)) {
                return Err(DataError::ContainsMissing {
                    column: column.name.clone(),
                    row: row + 1,
                });
            }
        }
        Ok(())
    }

    pub fn is_missing(&self, row: usize, col: usize) -> bool {
        self.columns[col].is_missing(row)
    }

    pub(crate) fn set_missing(&mut self, row: usize, col: usize) {
        self.columns[col].set_missing(row);
    }

    /// Rows x columns mask, `true` where a value is missing.
    pub fn missing_mask(&self) -> Array2<bool> {
        Array2::from_shape_fn((self.nrows(), self.ncols()), |(r, c)| self.is_missing(r, c))
    }

    pub fn count_missing_cells(&self) -> usize {
        self.missing_mask().iter().filter(|&&m| m).count()
    }

    /// Number of rows with at least one missing value.
    pub fn count_incomplete_rows(&self) -> usize {
        (0..self.nrows())
            .filter(|&r| (0..self.ncols()).any(|c| self.is_missing(r, c)))
            .count()
    }

    /// Converts every column to `f64`.
    pub fn to_numeric(&self) -> NumericData {
        let (nrows, ncols) = (self.nrows(), self.ncols());
        let mut matrix = Array2::zeros((nrows, ncols));
        let mut coerced = Vec::new();
        for (j, column) in self.columns.iter().enumerate() {
            if !column.is_numeric() {
                coerced.push(column.name.clone());
            }
            for (i, v) in column.coerce().into_iter().enumerate() {
                matrix[[i, j]] = v;
            }
        }
        NumericData { matrix, coerced }
    }
}
