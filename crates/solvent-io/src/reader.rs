//! Zip-compressed CSV dataset reader with full input validation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::RawTable;

/// Reads a client dataset from a zip-compressed CSV file.
///
/// The archive is expected to hold a single CSV member; the first entry
/// whose name ends in `.csv` is used, falling back to the first entry.
/// Expected CSV format:
/// - Header row required; all columns are read as provided, no index
///   column is assumed.
/// - Every cell must parse as a finite float; the categorical codes and
///   the target are small integers stored as such.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::ZipArchive`] | Archive is malformed or an entry is unreadable |
/// | [`IoError::EmptyArchive`] | Archive holds no entries |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::DuplicateColumn`] | Header repeats a column name |
/// | [`IoError::EmptyDataset`] | Zero data rows after the header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::InvalidValue`] | Cell is NaN, Inf, or unparseable |
pub struct DatasetReader {
    path: PathBuf,
}

impl DatasetReader {
    /// Create a new reader for the given archive path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and validate the archived CSV, returning a [`RawTable`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<RawTable, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut archive = zip::ZipArchive::new(file).map_err(|e| IoError::ZipArchive {
            path: self.path.clone(),
            source: e,
        })?;

        if archive.len() == 0 {
            return Err(IoError::EmptyArchive {
                path: self.path.clone(),
            });
        }

        // Locate the CSV member without assuming the archive layout.
        let mut csv_index = None;
        for i in 0..archive.len() {
            let entry = archive.by_index(i).map_err(|e| IoError::ZipArchive {
                path: self.path.clone(),
                source: e,
            })?;
            if entry.name().ends_with(".csv") {
                csv_index = Some(i);
                break;
            }
        }
        let index = csv_index.unwrap_or(0);

        let entry = archive.by_index(index).map_err(|e| IoError::ZipArchive {
            path: self.path.clone(),
            source: e,
        })?;
        debug!(entry = entry.name(), "reading archive member");

        // flexible(true) allows rows with varying column counts so that our own
        // InconsistentRowLength check fires instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(entry);

        let header = rdr.headers().map_err(|e| IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        })?;
        let columns: Vec<String> = header.iter().map(str::to_string).collect();
        let expected_cols = columns.len();

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(IoError::DuplicateColumn {
                    path: self.path.clone(),
                    column: column.clone(),
                });
            }
        }

        let mut rows = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            let mut cells = Vec::with_capacity(expected_cols);
            for (col_index, raw) in record.iter().enumerate() {
                let value: f64 = raw.parse().map_err(|_| IoError::InvalidValue {
                    path: self.path.clone(),
                    row_index,
                    column: columns[col_index].clone(),
                    raw: raw.to_string(),
                })?;
                if !value.is_finite() {
                    return Err(IoError::InvalidValue {
                        path: self.path.clone(),
                        row_index,
                        column: columns[col_index].clone(),
                        raw: raw.to_string(),
                    });
                }
                cells.push(value);
            }
            rows.push(cells);
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(
            n_rows = rows.len(),
            n_columns = expected_cols,
            "dataset loaded"
        );

        Ok(RawTable::new(columns, rows))
    }
}
