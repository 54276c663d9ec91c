//! Dataset cleaning rules for the raw client tables.

use tracing::{info, instrument};

use crate::IoError;
use crate::domain::{
    ClientTable, EDUCATION_COLUMN, ID_COLUMN, MARRIAGE_COLUMN, RAW_TARGET_COLUMN, RawTable,
    TARGET_COLUMN,
};

/// Highest education code kept as-is; anything above collapses into it.
const EDUCATION_OTHERS: f64 = 4.0;

/// Clean a raw client table.
///
/// Steps, in order:
/// 1. Rename `"default payment next month"` to `"default"` (when present).
/// 2. Drop the `ID` column (when present).
/// 3. Remove rows where `MARRIAGE` or `EDUCATION` is 0 (missing-value
///    sentinel).
/// 4. Clamp `EDUCATION` codes above 4 down to 4 ("others").
///
/// The rename and drop are conditional so that cleaning an already-clean
/// table is a no-op.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::MissingColumn`] | `default`, `EDUCATION`, or `MARRIAGE` absent |
/// | [`IoError::NoSurvivingRows`] | Every row was removed by the filters |
/// | [`IoError::NonBinaryTarget`] | Target cell is neither 0 nor 1 |
#[instrument(skip(raw), fields(n_rows_in = raw.n_rows()))]
pub fn clean(raw: RawTable) -> Result<ClientTable, IoError> {
    let (mut columns, mut rows) = raw.into_parts();
    let n_rows_in = rows.len();

    if let Some(idx) = columns.iter().position(|c| c == RAW_TARGET_COLUMN) {
        columns[idx] = TARGET_COLUMN.to_string();
    }

    if let Some(idx) = columns.iter().position(|c| c == ID_COLUMN) {
        columns.remove(idx);
        for row in &mut rows {
            row.remove(idx);
        }
    }

    let target_index = require_column(&columns, TARGET_COLUMN)?;
    let education = require_column(&columns, EDUCATION_COLUMN)?;
    let marriage = require_column(&columns, MARRIAGE_COLUMN)?;

    rows.retain(|row| row[marriage] != 0.0 && row[education] != 0.0);
    if rows.is_empty() {
        return Err(IoError::NoSurvivingRows);
    }

    for row in &mut rows {
        if row[education] > EDUCATION_OTHERS {
            row[education] = EDUCATION_OTHERS;
        }
    }

    for (row_index, row) in rows.iter().enumerate() {
        let value = row[target_index];
        if value != 0.0 && value != 1.0 {
            return Err(IoError::NonBinaryTarget { row_index, value });
        }
    }

    info!(
        n_rows_in,
        n_rows_out = rows.len(),
        n_removed = n_rows_in - rows.len(),
        "dataset cleaned"
    );

    Ok(ClientTable::new(columns, rows, target_index))
}

fn require_column(columns: &[String], name: &str) -> Result<usize, IoError> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| IoError::MissingColumn {
            column: name.to_string(),
        })
}
