//! Credit-default estimation: one-hot encoding, Random Forest
//! classification, cross-validated grid search, and model persistence.
//!
//! Provides a hand-rolled Random Forest classifier with CART decision
//! trees, Gini/Entropy split criteria, and parallel training via rayon,
//! composed behind a categorical one-hot encoder and tuned by an
//! exhaustive balanced-accuracy grid search.

mod config;
mod cv;
mod encode;
mod error;
mod forest;
mod grid;
mod metrics;
mod node;
mod pipeline;
mod predict;
mod serialize;
mod split;
mod tree;

pub use config::{MaxFeatures, RandomForestConfig};
pub use encode::OneHotEncoder;
pub use error::RfError;
pub use forest::RandomForest;
pub use grid::{GridSearch, GridSearchOutcome, ParamGrid};
pub use metrics::BinaryConfusion;
pub use node::{FeatureIndex, Node, NodeIndex};
pub use pipeline::{FittedPipeline, ForestParams, PipelineConfig};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
