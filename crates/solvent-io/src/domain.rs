//! Domain types for solvent-io.

use serde::Serialize;

/// Raw name of the target column as it appears in the input CSVs.
pub const RAW_TARGET_COLUMN: &str = "default payment next month";

/// Target column name after cleaning.
pub const TARGET_COLUMN: &str = "default";

/// Client identifier column, dropped during cleaning.
pub const ID_COLUMN: &str = "ID";

/// Client gender code column.
pub const SEX_COLUMN: &str = "SEX";

/// Education level code column. 0 is a missing-value sentinel; codes above
/// 4 are collapsed into the "others" bucket (4) during cleaning.
pub const EDUCATION_COLUMN: &str = "EDUCATION";

/// Marital status code column. 0 is a missing-value sentinel.
pub const MARRIAGE_COLUMN: &str = "MARRIAGE";

/// Categorical client attributes that get one-hot encoded downstream.
pub const CATEGORICAL_COLUMNS: [&str; 3] = [SEX_COLUMN, EDUCATION_COLUMN, MARRIAGE_COLUMN];

/// Which partition of the externally-split data a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Split::Train => f.write_str("train"),
            Split::Test => f.write_str("test"),
        }
    }
}

/// A table exactly as read from a zip-compressed CSV.
///
/// Column headers come from the CSV; cells are validated finite floats.
/// Produced by [`DatasetReader`](crate::DatasetReader) and consumed by
/// [`clean`](crate::clean).
#[derive(Debug, Clone)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl RawTable {
    /// Create a raw table from headers and row-major cells.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self { columns, rows }
    }

    /// Return the column headers.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Return the row-major cell values.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Return the number of data rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Vec<f64>>) {
        (self.columns, self.rows)
    }
}

/// A cleaned client table ready for model fitting.
///
/// Invariants, established by [`clean`](crate::clean): the target column is
/// named [`TARGET_COLUMN`] and holds only 0/1; the [`ID_COLUMN`] is absent;
/// no row has a zero MARRIAGE or EDUCATION code; EDUCATION codes are at
/// most 4.
#[derive(Debug, Clone)]
pub struct ClientTable {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
    target_index: usize,
}

impl ClientTable {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<f64>>, target_index: usize) -> Self {
        debug_assert_eq!(columns[target_index], TARGET_COLUMN);
        Self {
            columns,
            rows,
            target_index,
        }
    }

    /// Return all column headers, including the target.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Return the row-major cell values, including the target column.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Return the number of data rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Return the feature column names (everything except the target).
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != self.target_index)
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Return the feature matrix (row-major, target column removed).
    #[must_use]
    pub fn features(&self) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|&(i, _)| i != self.target_index)
                    .map(|(_, &v)| v)
                    .collect()
            })
            .collect()
    }

    /// Return the binary target vector.
    #[must_use]
    pub fn labels(&self) -> Vec<usize> {
        self.rows
            .iter()
            .map(|row| row[self.target_index] as usize)
            .collect()
    }
}
