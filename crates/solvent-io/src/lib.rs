//! Dataset loading, cleaning, and metrics output for the solvent pipeline.

mod clean;
mod domain;
mod error;
mod reader;
mod writer;

pub use clean::clean;
pub use domain::{
    CATEGORICAL_COLUMNS, ClientTable, EDUCATION_COLUMN, ID_COLUMN, MARRIAGE_COLUMN,
    RAW_TARGET_COLUMN, RawTable, SEX_COLUMN, Split, TARGET_COLUMN,
};
pub use error::IoError;
pub use reader::DatasetReader;
pub use writer::{ConfusionRecord, MetricsRecord, MetricsReport, MetricsWriter, PredictedCounts};
