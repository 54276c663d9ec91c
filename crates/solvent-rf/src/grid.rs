//! Exhaustive grid search with cross-validated balanced-accuracy scoring.

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::cv::stratified_folds;
use crate::error::RfError;
use crate::metrics::BinaryConfusion;
use crate::pipeline::{FittedPipeline, ForestParams, PipelineConfig};

/// A discrete hyperparameter grid for the forest stage of the pipeline.
///
/// The search space is the Cartesian product of the four axes, iterated
/// with `n_estimators` as the outermost axis and `min_samples_leaf` as
/// the innermost.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    /// Candidate tree counts.
    pub n_estimators: Vec<usize>,
    /// Candidate depth limits (`None` = unlimited).
    pub max_depth: Vec<Option<usize>>,
    /// Candidate split minimums.
    pub min_samples_split: Vec<usize>,
    /// Candidate leaf minimums.
    pub min_samples_leaf: Vec<usize>,
}

impl ParamGrid {
    /// Enumerate the full Cartesian product in axis order.
    #[must_use]
    pub fn candidates(&self) -> Vec<ForestParams> {
        let mut out = Vec::with_capacity(self.len());
        for &n_estimators in &self.n_estimators {
            for &max_depth in &self.max_depth {
                for &min_samples_split in &self.min_samples_split {
                    for &min_samples_leaf in &self.min_samples_leaf {
                        out.push(ForestParams {
                            n_estimators,
                            max_depth,
                            min_samples_split,
                            min_samples_leaf,
                        });
                    }
                }
            }
        }
        out
    }

    /// Return the number of grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.n_estimators.len()
            * self.max_depth.len()
            * self.min_samples_split.len()
            * self.min_samples_leaf.len()
    }

    /// Return `true` when any axis is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self) -> Result<(), RfError> {
        let axes: [(&'static str, usize); 4] = [
            ("n_estimators", self.n_estimators.len()),
            ("max_depth", self.max_depth.len()),
            ("min_samples_split", self.min_samples_split.len()),
            ("min_samples_leaf", self.min_samples_leaf.len()),
        ];
        for (axis, len) in axes {
            if len == 0 {
                return Err(RfError::EmptyGridAxis { axis });
            }
        }
        Ok(())
    }
}

/// Result of a grid search: the refit best pipeline and its score.
#[derive(Debug)]
pub struct GridSearchOutcome {
    /// The winning pipeline, refit on the full training set.
    pub pipeline: FittedPipeline,
    /// The winning grid point.
    pub best_params: ForestParams,
    /// Mean cross-validated balanced accuracy of the winner.
    pub best_score: f64,
    /// Number of grid points evaluated.
    pub n_candidates: usize,
}

/// Exhaustive hyperparameter search over a [`ParamGrid`].
///
/// Every candidate is scored by stratified k-fold cross-validation with
/// balanced accuracy on each held-out fold, averaged across folds.
/// Candidates are evaluated in parallel; the same fold assignment is
/// shared by all of them. Ties break toward the earliest grid position.
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: ParamGrid,
    n_folds: usize,
    seed: u64,
}

impl GridSearch {
    /// Create a new grid search.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::InvalidFoldCount`] | `n_folds` < 2 |
    /// | [`RfError::EmptyGridAxis`] | A grid axis has no values |
    pub fn new(grid: ParamGrid, n_folds: usize) -> Result<Self, RfError> {
        if n_folds < 2 {
            return Err(RfError::InvalidFoldCount { n_folds });
        }
        grid.validate()?;
        Ok(Self {
            grid,
            n_folds,
            seed: 42,
        })
    }

    /// Set the random seed used for fold shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Run the search and refit the winner on the full training set.
    ///
    /// `pipeline` supplies the categorical column list and the base forest
    /// configuration (criterion, max-features strategy, seed); each grid
    /// point overlays only the tunable parameters.
    ///
    /// # Errors
    ///
    /// Propagates fold-assignment errors ([`RfError::TooFewSamplesForFolds`],
    /// …), candidate fitting errors, and scoring errors
    /// ([`RfError::NonBinaryLabel`] for a non-binary target).
    #[instrument(skip_all, fields(n_candidates = self.grid.len(), n_folds = self.n_folds))]
    pub fn fit(
        &self,
        pipeline: &PipelineConfig,
        feature_names: &[String],
        rows: &[Vec<f64>],
        labels: &[usize],
    ) -> Result<GridSearchOutcome, RfError> {
        if rows.is_empty() {
            return Err(RfError::EmptyDataset);
        }

        let fold_assignments = stratified_folds(labels, self.n_folds, self.seed)?;
        let candidates = self.grid.candidates();

        info!(
            n_candidates = candidates.len(),
            n_folds = self.n_folds,
            n_samples = rows.len(),
            "starting grid search"
        );

        let scores: Vec<f64> = candidates
            .par_iter()
            .map(|params| {
                self.score_candidate(pipeline, *params, feature_names, rows, labels, &fold_assignments)
            })
            .collect::<Result<Vec<_>, RfError>>()?;

        // Highest mean score wins; the first candidate wins ties.
        let mut best_index = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, &score) in scores.iter().enumerate() {
            if score > best_score {
                best_index = i;
                best_score = score;
            }
        }
        let best_params = candidates[best_index];

        info!(
            best_score,
            n_estimators = best_params.n_estimators,
            max_depth = ?best_params.max_depth,
            min_samples_split = best_params.min_samples_split,
            min_samples_leaf = best_params.min_samples_leaf,
            "grid search complete, refitting winner"
        );

        let refit_config = best_params.apply_to(pipeline.forest())?;
        let refit = PipelineConfig::new(pipeline.categorical().to_vec(), refit_config)
            .fit(feature_names, rows, labels)?
            .with_cv_score(best_score);

        Ok(GridSearchOutcome {
            pipeline: refit,
            best_params,
            best_score,
            n_candidates: candidates.len(),
        })
    }

    /// Mean balanced accuracy of one grid point across all folds.
    fn score_candidate(
        &self,
        pipeline: &PipelineConfig,
        params: ForestParams,
        feature_names: &[String],
        rows: &[Vec<f64>],
        labels: &[usize],
        fold_assignments: &[usize],
    ) -> Result<f64, RfError> {
        let mut score_sum = 0.0;

        for fold in 0..self.n_folds {
            let mut train_rows = Vec::new();
            let mut train_labels = Vec::new();
            let mut val_rows = Vec::new();
            let mut val_labels = Vec::new();

            for (i, &assigned) in fold_assignments.iter().enumerate() {
                if assigned == fold {
                    val_rows.push(rows[i].clone());
                    val_labels.push(labels[i]);
                } else {
                    train_rows.push(rows[i].clone());
                    train_labels.push(labels[i]);
                }
            }

            // Offset the seed so each fold trains with different randomness.
            let fold_config = params
                .apply_to(pipeline.forest())?
                .with_seed(pipeline.forest().seed().wrapping_add(fold as u64));
            let fitted = PipelineConfig::new(pipeline.categorical().to_vec(), fold_config)
                .fit(feature_names, &train_rows, &train_labels)?;

            let predictions = fitted.predict(&val_rows)?;
            let confusion = BinaryConfusion::from_labels(&val_labels, &predictions)?;
            let fold_score = confusion.balanced_accuracy();
            score_sum += fold_score;

            debug!(
                fold,
                fold_score,
                n_estimators = params.n_estimators,
                "fold scored"
            );
        }

        Ok(score_sum / self.n_folds as f64)
    }
}
