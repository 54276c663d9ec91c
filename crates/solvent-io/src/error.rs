//! I/O error types for solvent-io.

use std::path::PathBuf;

/// Errors from archive handling, CSV parsing, cleaning, and metrics output.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the zip archive cannot be opened or an entry cannot be read.
    #[error("invalid zip archive: {path}")]
    ZipArchive {
        /// Path to the archive.
        path: PathBuf,
        /// Underlying zip error.
        source: zip::result::ZipError,
    },

    /// Returned when the zip archive contains no entries.
    #[error("zip archive {path} has no entries")]
    EmptyArchive {
        /// Path to the archive.
        path: PathBuf,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the archive containing the CSV.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the archive containing the CSV.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the archive containing the CSV.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when a cell value is NaN, Inf, or otherwise not a finite float.
    #[error("invalid value in {path}: row {row_index}, column \"{column}\", raw value \"{raw}\"")]
    InvalidValue {
        /// Path to the archive containing the CSV.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Name of the offending column.
        column: String,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when the same column name appears more than once in the header.
    #[error("duplicate column \"{column}\" in {path}")]
    DuplicateColumn {
        /// Path to the archive containing the CSV.
        path: PathBuf,
        /// The duplicated column name.
        column: String,
    },

    /// Returned when a column required by the cleaning rules is absent.
    #[error("missing required column \"{column}\"")]
    MissingColumn {
        /// The expected column name.
        column: String,
    },

    /// Returned when every row was removed by the missing-code filters.
    #[error("no rows survived cleaning")]
    NoSurvivingRows,

    /// Returned when the target column holds a value other than 0 or 1.
    #[error("non-binary target value {value} at row {row_index}")]
    NonBinaryTarget {
        /// Zero-based row index in the cleaned table.
        row_index: usize,
        /// The offending target value.
        value: f64,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
