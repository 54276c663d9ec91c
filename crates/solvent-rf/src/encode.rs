//! One-hot encoding of categorical feature columns.

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::error::RfError;

/// A fitted one-hot encoder over named feature columns.
///
/// Categorical columns are replaced by indicator blocks, one position per
/// category code seen during fitting; all other columns pass through
/// unchanged. Encoded blocks come first in the output, passthrough columns
/// after, mirroring the column order produced at fit time. A category code
/// unseen during fitting maps to an all-zero block rather than an error.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OneHotEncoder {
    encoded: Vec<EncodedColumn>,
    passthrough: Vec<usize>,
    output_names: Vec<String>,
    n_input_features: usize,
}

/// One categorical input column and its learned category codes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct EncodedColumn {
    input_index: usize,
    name: String,
    /// Sorted distinct category codes seen at fit time.
    categories: Vec<i64>,
}

impl OneHotEncoder {
    /// Learn category codes for the named categorical columns.
    ///
    /// `feature_names` and `rows` describe the raw (pre-encoding) feature
    /// matrix; `categorical` names the columns to encode, in the order
    /// their indicator blocks will appear in the output.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | `rows` is empty |
    /// | [`RfError::FeatureCountMismatch`] | A row width differs from the header |
    /// | [`RfError::UnknownCategoricalColumn`] | A categorical name is not a feature column |
    /// | [`RfError::NonIntegerCategory`] | A categorical cell is not an integer code |
    #[instrument(skip_all, fields(n_rows = rows.len(), n_categorical = categorical.len()))]
    pub fn fit(
        feature_names: &[String],
        rows: &[Vec<f64>],
        categorical: &[String],
    ) -> Result<Self, RfError> {
        if rows.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        let n_input_features = feature_names.len();
        for (sample_index, row) in rows.iter().enumerate() {
            if row.len() != n_input_features {
                return Err(RfError::FeatureCountMismatch {
                    expected: n_input_features,
                    got: row.len(),
                    sample_index,
                });
            }
        }

        let mut encoded = Vec::with_capacity(categorical.len());
        for name in categorical {
            let input_index = feature_names
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| RfError::UnknownCategoricalColumn {
                    column: name.clone(),
                })?;

            let mut codes = BTreeSet::new();
            for row in rows {
                codes.insert(category_code(name, row[input_index])?);
            }

            encoded.push(EncodedColumn {
                input_index,
                name: name.clone(),
                categories: codes.into_iter().collect(),
            });
        }

        let categorical_indices: BTreeSet<usize> =
            encoded.iter().map(|c| c.input_index).collect();
        let passthrough: Vec<usize> = (0..n_input_features)
            .filter(|i| !categorical_indices.contains(i))
            .collect();

        let mut output_names = Vec::new();
        for column in &encoded {
            for &code in &column.categories {
                output_names.push(format!("{}_{}", column.name, code));
            }
        }
        for &i in &passthrough {
            output_names.push(feature_names[i].clone());
        }

        debug!(
            n_input = n_input_features,
            n_output = output_names.len(),
            "one-hot encoder fitted"
        );

        Ok(Self {
            encoded,
            passthrough,
            output_names,
            n_input_features,
        })
    }

    /// Encode a batch of raw feature rows.
    ///
    /// Unknown category codes (including non-integer cells) produce an
    /// all-zero indicator block.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::FeatureCountMismatch`] when a row width differs
    /// from the fitted input width.
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, RfError> {
        rows.iter()
            .enumerate()
            .map(|(sample_index, row)| {
                if row.len() != self.n_input_features {
                    return Err(RfError::FeatureCountMismatch {
                        expected: self.n_input_features,
                        got: row.len(),
                        sample_index,
                    });
                }
                let mut out = Vec::with_capacity(self.output_names.len());
                for column in &self.encoded {
                    let start = out.len();
                    out.resize(start + column.categories.len(), 0.0);
                    let value = row[column.input_index];
                    if value.is_finite() && value.fract() == 0.0 {
                        if let Ok(pos) = column.categories.binary_search(&(value as i64)) {
                            out[start + pos] = 1.0;
                        }
                    }
                }
                for &i in &self.passthrough {
                    out.push(row[i]);
                }
                Ok(out)
            })
            .collect()
    }

    /// Return the output feature names (indicator blocks, then passthrough).
    #[must_use]
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Return the number of raw input features this encoder expects.
    #[must_use]
    pub fn n_input_features(&self) -> usize {
        self.n_input_features
    }

    /// Return the number of encoded output features.
    #[must_use]
    pub fn n_output_features(&self) -> usize {
        self.output_names.len()
    }
}

/// Validate and convert a categorical cell to its integer code.
fn category_code(column: &str, value: f64) -> Result<i64, RfError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(RfError::NonIntegerCategory {
            column: column.to_string(),
            value,
        });
    }
    Ok(value as i64)
}
