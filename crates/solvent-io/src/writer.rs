//! JSON-lines writer for evaluation metrics and confusion matrices.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::Split;

/// Output file name for the metric records.
const METRICS_FILE: &str = "metrics.json";

/// A scalar-metrics record for one dataset split.
///
/// Serializes as
/// `{"type":"metrics","dataset":"train","precision":…,"balanced_accuracy":…,"recall":…,"f1_score":…}`.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    dataset: Split,
    precision: f64,
    balanced_accuracy: f64,
    recall: f64,
    f1_score: f64,
}

impl MetricsRecord {
    /// Build a metrics record from already-computed scalar values.
    ///
    /// Accepts primitives so this crate stays independent of the estimator
    /// crate.
    #[must_use]
    pub fn new(
        dataset: Split,
        precision: f64,
        balanced_accuracy: f64,
        recall: f64,
        f1_score: f64,
    ) -> Self {
        Self {
            record_type: "metrics",
            dataset,
            precision,
            balanced_accuracy,
            recall,
            f1_score,
        }
    }
}

/// Predicted-class counts for one true class.
#[derive(Debug, Clone, Serialize)]
pub struct PredictedCounts {
    predicted_0: usize,
    predicted_1: usize,
}

/// A 2x2 confusion-matrix record for one dataset split.
///
/// Serializes as
/// `{"type":"cm_matrix","dataset":"test","true_0":{"predicted_0":…,"predicted_1":…},"true_1":{…}}`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfusionRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    dataset: Split,
    true_0: PredictedCounts,
    true_1: PredictedCounts,
}

impl ConfusionRecord {
    /// Build a confusion record from raw counts.
    ///
    /// `counts[true_class][predicted_class]` — row-major 2x2.
    #[must_use]
    pub fn new(dataset: Split, counts: [[usize; 2]; 2]) -> Self {
        Self {
            record_type: "cm_matrix",
            dataset,
            true_0: PredictedCounts {
                predicted_0: counts[0][0],
                predicted_1: counts[0][1],
            },
            true_1: PredictedCounts {
                predicted_0: counts[1][0],
                predicted_1: counts[1][1],
            },
        }
    }
}

/// The four records produced by one run, in their output order.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub train_metrics: MetricsRecord,
    pub test_metrics: MetricsRecord,
    pub train_confusion: ConfusionRecord,
    pub test_confusion: ConfusionRecord,
}

/// Writes metric records as JSON lines under a fixed output directory.
///
/// Creates the output directory on construction if it does not exist.
/// The output file is truncated on every write.
pub struct MetricsWriter {
    output_dir: PathBuf,
}

impl MetricsWriter {
    /// Create a new writer targeting the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display()))]
    pub fn new(output_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Return the path of the metrics file.
    ///
    /// Does not write anything — just computes `{output_dir}/metrics.json`.
    #[must_use]
    pub fn metrics_path(&self) -> PathBuf {
        self.output_dir.join(METRICS_FILE)
    }

    /// Write the report as four JSON lines in the fixed order: train
    /// metrics, test metrics, train confusion, test confusion.
    ///
    /// Any existing file at the target path is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write_report(&self, report: &MetricsReport) -> Result<(), IoError> {
        let path = self.metrics_path();

        let lines = [
            serde_json::to_string(&report.train_metrics).expect("serialization cannot fail"),
            serde_json::to_string(&report.test_metrics).expect("serialization cannot fail"),
            serde_json::to_string(&report.train_confusion).expect("serialization cannot fail"),
            serde_json::to_string(&report.test_confusion).expect("serialization cannot fail"),
        ];
        let body = lines.join("\n") + "\n";

        fs::write(&path, body).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), n_records = lines.len(), "metrics written");
        Ok(())
    }
}
