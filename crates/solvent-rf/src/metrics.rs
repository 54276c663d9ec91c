//! Binary classification metrics derived from a 2x2 confusion matrix.

use std::fmt;

use crate::error::RfError;

/// A confusion matrix for binary classification.
///
/// Entry `counts[true_class][predicted_class]` counts how many samples
/// with true label `true_class` were predicted as `predicted_class`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryConfusion {
    counts: [[usize; 2]; 2],
}

impl BinaryConfusion {
    /// Build a confusion matrix from true and predicted labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | Zero labels provided |
    /// | [`RfError::LabelLengthMismatch`] | Vectors differ in length |
    /// | [`RfError::NonBinaryLabel`] | A label is outside {0, 1} |
    pub fn from_labels(true_labels: &[usize], predicted: &[usize]) -> Result<Self, RfError> {
        if true_labels.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if true_labels.len() != predicted.len() {
            return Err(RfError::LabelLengthMismatch {
                true_len: true_labels.len(),
                pred_len: predicted.len(),
            });
        }
        let mut counts = [[0usize; 2]; 2];
        for (index, (&t, &p)) in true_labels.iter().zip(predicted.iter()).enumerate() {
            if t > 1 {
                return Err(RfError::NonBinaryLabel { index, label: t });
            }
            if p > 1 {
                return Err(RfError::NonBinaryLabel { index, label: p });
            }
            counts[t][p] += 1;
        }
        Ok(Self { counts })
    }

    /// Return the raw counts, `counts[true_class][predicted_class]`.
    #[must_use]
    pub fn counts(&self) -> [[usize; 2]; 2] {
        self.counts
    }

    /// Return the total number of samples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    fn true_positives(&self) -> usize {
        self.counts[1][1]
    }

    fn false_positives(&self) -> usize {
        self.counts[0][1]
    }

    fn false_negatives(&self) -> usize {
        self.counts[1][0]
    }

    fn true_negatives(&self) -> usize {
        self.counts[0][0]
    }

    /// Precision of the positive class: TP / (TP + FP).
    ///
    /// 0.0 when nothing was predicted positive.
    #[must_use]
    pub fn precision(&self) -> f64 {
        let tp = self.true_positives();
        let denom = tp + self.false_positives();
        if denom == 0 {
            0.0
        } else {
            tp as f64 / denom as f64
        }
    }

    /// Recall of the positive class: TP / (TP + FN).
    ///
    /// 0.0 when no true positives exist.
    #[must_use]
    pub fn recall(&self) -> f64 {
        let tp = self.true_positives();
        let denom = tp + self.false_negatives();
        if denom == 0 {
            0.0
        } else {
            tp as f64 / denom as f64
        }
    }

    /// F1 score: harmonic mean of precision and recall.
    ///
    /// 0.0 when both precision and recall are zero.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Balanced accuracy: mean of the per-class recalls.
    ///
    /// A class with zero support contributes 0.0 to the mean.
    #[must_use]
    pub fn balanced_accuracy(&self) -> f64 {
        let recall_0 = {
            let tn = self.true_negatives();
            let denom = tn + self.false_positives();
            if denom == 0 {
                0.0
            } else {
                tn as f64 / denom as f64
            }
        };
        (recall_0 + self.recall()) / 2.0
    }
}

impl fmt::Display for BinaryConfusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>8} {:>7} {:>7}", "", "pred_0", "pred_1")?;
        for (i, row) in self.counts.iter().enumerate() {
            writeln!(f, "true_{i:>3} {:>7} {:>7}", row[0], row[1])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let cm = BinaryConfusion::from_labels(&[0, 0, 1, 1], &[0, 0, 1, 1]).unwrap();
        assert!((cm.precision() - 1.0).abs() < f64::EPSILON);
        assert!((cm.recall() - 1.0).abs() < f64::EPSILON);
        assert!((cm.f1() - 1.0).abs() < f64::EPSILON);
        assert!((cm.balanced_accuracy() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn known_metric_values() {
        // One false positive among four samples.
        let cm = BinaryConfusion::from_labels(&[0, 0, 1, 1], &[0, 1, 1, 1]).unwrap();
        assert_eq!(cm.counts(), [[1, 1], [0, 2]]);
        assert!((cm.precision() - 2.0 / 3.0).abs() < 1e-10);
        assert!((cm.recall() - 1.0).abs() < 1e-10);
        assert!((cm.f1() - 0.8).abs() < 1e-10);
        assert!((cm.balanced_accuracy() - 0.75).abs() < 1e-10);
    }

    #[test]
    fn counts_sum_to_sample_count() {
        let true_labels = vec![0, 1, 1, 0, 1, 0, 0, 1, 1];
        let predicted = vec![0, 1, 0, 1, 1, 0, 1, 0, 1];
        let cm = BinaryConfusion::from_labels(&true_labels, &predicted).unwrap();
        assert_eq!(cm.total(), true_labels.len());
    }

    #[test]
    fn precision_formula_against_counts() {
        let cm = BinaryConfusion::from_labels(&[0, 1, 1, 0, 1], &[1, 1, 0, 0, 1]).unwrap();
        let counts = cm.counts();
        let denom = counts[1][1] + counts[0][1];
        assert!((cm.precision() - counts[1][1] as f64 / denom as f64).abs() < 1e-12);
    }

    #[test]
    fn all_negative_predictions_zero_precision() {
        let cm = BinaryConfusion::from_labels(&[0, 0, 1, 1], &[0, 0, 0, 0]).unwrap();
        assert!((cm.precision() - 0.0).abs() < f64::EPSILON);
        assert!((cm.recall() - 0.0).abs() < f64::EPSILON);
        assert!((cm.f1() - 0.0).abs() < f64::EPSILON);
        // Recall of class 0 is perfect, class 1 is zero.
        assert!((cm.balanced_accuracy() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn no_positive_support_zero_recall() {
        let cm = BinaryConfusion::from_labels(&[0, 0, 0], &[0, 1, 0]).unwrap();
        assert!((cm.recall() - 0.0).abs() < f64::EPSILON);
        assert!((cm.f1() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_labels_error() {
        let err = BinaryConfusion::from_labels(&[], &[]).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn length_mismatch_error() {
        let err = BinaryConfusion::from_labels(&[0, 1], &[0]).unwrap_err();
        assert!(matches!(
            err,
            RfError::LabelLengthMismatch { true_len: 2, pred_len: 1 }
        ));
    }

    #[test]
    fn non_binary_label_error() {
        let err = BinaryConfusion::from_labels(&[0, 2], &[0, 1]).unwrap_err();
        assert!(matches!(err, RfError::NonBinaryLabel { index: 1, label: 2 }));
    }

    #[test]
    fn display_formatting() {
        let cm = BinaryConfusion::from_labels(&[0, 1], &[0, 1]).unwrap();
        let output = format!("{cm}");
        assert!(output.contains("pred_0"));
        assert!(output.contains("true_"));
    }
}
