//! Two-stage estimator pipeline: one-hot encoding into a Random Forest.

use tracing::{info, instrument};

use crate::config::RandomForestConfig;
use crate::encode::OneHotEncoder;
use crate::error::RfError;
use crate::forest::RandomForest;

/// The tunable forest hyperparameters recorded with a fitted pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ForestParams {
    /// Number of trees in the ensemble.
    pub n_estimators: usize,
    /// Maximum tree depth; `None` means unlimited.
    pub max_depth: Option<usize>,
    /// Minimum samples required to attempt a split.
    pub min_samples_split: usize,
    /// Minimum samples required in each leaf.
    pub min_samples_leaf: usize,
}

impl ForestParams {
    /// Read the tunable parameters out of a forest config.
    #[must_use]
    pub fn from_config(config: &RandomForestConfig) -> Self {
        Self {
            n_estimators: config.n_trees(),
            max_depth: config.max_depth(),
            min_samples_split: config.min_samples_split(),
            min_samples_leaf: config.min_samples_leaf(),
        }
    }

    /// Overlay these parameters on a base config, keeping its criterion,
    /// max-features strategy, and seed.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_estimators` is zero.
    pub fn apply_to(&self, base: &RandomForestConfig) -> Result<RandomForestConfig, RfError> {
        Ok(base
            .clone()
            .with_n_trees(self.n_estimators)?
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf))
    }
}

/// Configuration for the encode-then-classify pipeline.
///
/// Couples the list of categorical columns (encoded stage one) with the
/// forest configuration (stage two).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    categorical: Vec<String>,
    forest: RandomForestConfig,
}

impl PipelineConfig {
    /// Create a pipeline config.
    #[must_use]
    pub fn new(categorical: Vec<String>, forest: RandomForestConfig) -> Self {
        Self {
            categorical,
            forest,
        }
    }

    /// Return the categorical column names.
    #[must_use]
    pub fn categorical(&self) -> &[String] {
        &self.categorical
    }

    /// Return the forest configuration.
    #[must_use]
    pub fn forest(&self) -> &RandomForestConfig {
        &self.forest
    }

    /// Fit the full pipeline: learn encoder categories on the training
    /// rows, encode, then train the forest on the encoded matrix.
    ///
    /// # Errors
    ///
    /// Propagates encoder fitting errors ([`RfError::UnknownCategoricalColumn`],
    /// [`RfError::NonIntegerCategory`], …) and forest training errors.
    #[instrument(skip_all, fields(n_samples = rows.len()))]
    pub fn fit(
        &self,
        feature_names: &[String],
        rows: &[Vec<f64>],
        labels: &[usize],
    ) -> Result<FittedPipeline, RfError> {
        let encoder = OneHotEncoder::fit(feature_names, rows, &self.categorical)?;
        let encoded = encoder.transform(rows)?;
        let forest = self.forest.fit(&encoded, labels)?;

        info!(
            n_input_features = encoder.n_input_features(),
            n_encoded_features = encoder.n_output_features(),
            n_trees = forest.n_trees(),
            "pipeline fitted"
        );

        Ok(FittedPipeline {
            encoder,
            forest,
            params: ForestParams::from_config(&self.forest),
            cv_score: None,
            feature_names: feature_names.to_vec(),
        })
    }
}

/// A fitted pipeline: encoder categories, trained forest, and the
/// hyperparameters that produced them.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FittedPipeline {
    pub(crate) encoder: OneHotEncoder,
    pub(crate) forest: RandomForest,
    pub(crate) params: ForestParams,
    pub(crate) cv_score: Option<f64>,
    pub(crate) feature_names: Vec<String>,
}

impl FittedPipeline {
    /// Predict class labels for raw (pre-encoding) feature rows.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::FeatureCountMismatch`] when a row width differs
    /// from the fitted input width.
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        let encoded = self.encoder.transform(rows)?;
        self.forest.predict_batch(&encoded)
    }

    /// Return the fitted encoder.
    #[must_use]
    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    /// Return the trained forest.
    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Return the hyperparameters used for the final fit.
    #[must_use]
    pub fn params(&self) -> ForestParams {
        self.params
    }

    /// Return the best cross-validated balanced accuracy, when this
    /// pipeline came out of a grid search.
    #[must_use]
    pub fn cv_score(&self) -> Option<f64> {
        self.cv_score
    }

    /// Return the raw input feature names the pipeline was fitted on.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub(crate) fn with_cv_score(mut self, score: f64) -> Self {
        self.cv_score = Some(score);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaxFeatures;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Two well-separated classes; SEX carries no signal, AMOUNT does.
    fn sample_data() -> (Vec<String>, Vec<Vec<f64>>, Vec<usize>) {
        let feature_names = names(&["SEX", "AMOUNT"]);
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..15 {
            rows.push(vec![1.0 + (i % 2) as f64, i as f64]);
            labels.push(0);
        }
        for i in 0..15 {
            rows.push(vec![1.0 + (i % 2) as f64, 100.0 + i as f64]);
            labels.push(1);
        }
        (feature_names, rows, labels)
    }

    fn sample_config() -> PipelineConfig {
        let forest = RandomForestConfig::new(20)
            .unwrap()
            .with_max_features(MaxFeatures::All)
            .with_seed(42);
        PipelineConfig::new(names(&["SEX"]), forest)
    }

    #[test]
    fn fit_and_predict_training_rows() {
        let (feature_names, rows, labels) = sample_data();
        let fitted = sample_config().fit(&feature_names, &rows, &labels).unwrap();
        let preds = fitted.predict(&rows).unwrap();
        let correct = preds.iter().zip(&labels).filter(|&(&p, &l)| p == l).count();
        assert!(correct as f64 / labels.len() as f64 > 0.9);
    }

    #[test]
    fn records_fit_parameters() {
        let (feature_names, rows, labels) = sample_data();
        let fitted = sample_config().fit(&feature_names, &rows, &labels).unwrap();
        let params = fitted.params();
        assert_eq!(params.n_estimators, 20);
        assert_eq!(params.max_depth, None);
        assert_eq!(params.min_samples_split, 2);
        assert_eq!(params.min_samples_leaf, 1);
        assert!(fitted.cv_score().is_none());
    }

    #[test]
    fn predict_accepts_unknown_category() {
        let (feature_names, rows, labels) = sample_data();
        let fitted = sample_config().fit(&feature_names, &rows, &labels).unwrap();
        // SEX=9 never seen; prediction still succeeds via the zero block.
        let preds = fitted.predict(&[vec![9.0, 105.0]]).unwrap();
        assert_eq!(preds.len(), 1);
    }

    #[test]
    fn apply_to_overlays_tunables_only() {
        let base = RandomForestConfig::new(100)
            .unwrap()
            .with_seed(7)
            .with_max_features(MaxFeatures::All);
        let params = ForestParams {
            n_estimators: 10,
            max_depth: Some(5),
            min_samples_split: 3,
            min_samples_leaf: 2,
        };
        let config = params.apply_to(&base).unwrap();
        assert_eq!(config.n_trees(), 10);
        assert_eq!(config.max_depth(), Some(5));
        assert_eq!(config.min_samples_split(), 3);
        assert_eq!(config.min_samples_leaf(), 2);
        assert_eq!(config.seed(), 7);
        assert_eq!(config.max_features(), MaxFeatures::All);
    }

    #[test]
    fn apply_to_rejects_zero_trees() {
        let base = RandomForestConfig::new(10).unwrap();
        let params = ForestParams {
            n_estimators: 0,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        };
        assert!(params.apply_to(&base).is_err());
    }
}
