//! Model persistence: bincode encoding wrapped in gzip compression.

use std::io::{Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tracing::{debug, info, instrument};

use crate::error::RfError;
use crate::pipeline::{FittedPipeline, ForestParams};

/// Current binary format version.
const FORMAT_VERSION: u32 = 1;

/// Versioned envelope for the serialized pipeline.
#[derive(serde::Serialize, serde::Deserialize)]
struct ModelEnvelope {
    /// Format version for compatibility checking.
    format_version: u32,
    /// Number of trees in the forest.
    n_trees: usize,
    /// Number of raw input features the pipeline expects.
    n_features_in: usize,
    /// Hyperparameters chosen for the final fit.
    params: ForestParams,
    /// The serialized pipeline.
    pipeline: FittedPipeline,
}

impl FittedPipeline {
    /// Save the pipeline to a gzip-compressed binary file.
    ///
    /// Uses bincode encoding wrapped in a versioned envelope, then gzip.
    /// Parent directories are created as needed; an existing file at the
    /// target path is overwritten.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::SerializeModel`] | bincode encoding failed |
    /// | [`RfError::WriteModel`] | directory creation or file write failed |
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RfError> {
        let path = path.as_ref();

        let envelope = ModelEnvelope {
            format_version: FORMAT_VERSION,
            n_trees: self.forest.n_trees(),
            n_features_in: self.encoder.n_input_features(),
            params: self.params,
            pipeline: self.clone(),
        };

        let bytes =
            bincode::serialize(&envelope).map_err(|e| RfError::SerializeModel { source: e })?;

        let write_err = |e: std::io::Error| RfError::WriteModel {
            path: path.to_path_buf(),
            source: e,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let file = std::fs::File::create(path).map_err(write_err)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(&bytes).map_err(write_err)?;
        encoder.finish().map_err(write_err)?;

        info!(
            uncompressed_bytes = bytes.len(),
            n_trees = self.forest.n_trees(),
            "model saved"
        );

        Ok(())
    }

    /// Load a pipeline from a gzip-compressed binary file.
    ///
    /// Checks the format version and returns an error on mismatch.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::ReadModel`] | file read or gzip decompression failed |
    /// | [`RfError::DeserializeModel`] | bincode decoding failed |
    /// | [`RfError::IncompatibleModelVersion`] | format version mismatch |
    #[instrument(fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RfError> {
        let path = path.as_ref();

        let read_err = |e: std::io::Error| RfError::ReadModel {
            path: path.to_path_buf(),
            source: e,
        };

        let file = std::fs::File::open(path).map_err(read_err)?;
        let mut decoder = GzDecoder::new(file);
        let mut bytes = Vec::new();
        decoder.read_to_end(&mut bytes).map_err(read_err)?;

        let envelope: ModelEnvelope =
            bincode::deserialize(&bytes).map_err(|e| RfError::DeserializeModel {
                path: path.to_path_buf(),
                source: e,
            })?;

        if envelope.format_version != FORMAT_VERSION {
            return Err(RfError::IncompatibleModelVersion {
                expected: FORMAT_VERSION,
                found: envelope.format_version,
                path: path.to_path_buf(),
            });
        }

        debug!(
            n_trees = envelope.n_trees,
            n_features_in = envelope.n_features_in,
            "model loaded"
        );

        Ok(envelope.pipeline)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use crate::config::{MaxFeatures, RandomForestConfig};
    use crate::pipeline::{FittedPipeline, PipelineConfig};

    fn train_simple_pipeline() -> (FittedPipeline, Vec<Vec<f64>>) {
        let feature_names: Vec<String> =
            ["KIND", "AMOUNT"].iter().map(|s| s.to_string()).collect();
        let rows = vec![
            vec![1.0, 1.0],
            vec![2.0, 2.0],
            vec![1.0, 3.0],
            vec![2.0, 10.0],
            vec![1.0, 11.0],
            vec![2.0, 12.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let forest = RandomForestConfig::new(5)
            .unwrap()
            .with_max_features(MaxFeatures::All)
            .with_seed(42);
        let fitted = PipelineConfig::new(vec!["KIND".to_string()], forest)
            .fit(&feature_names, &rows, &labels)
            .unwrap();
        (fitted, rows)
    }

    #[test]
    fn round_trip_identical_predictions() {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("model.bin.gz");

        let (fitted, rows) = train_simple_pipeline();
        fitted.save(&model_path).unwrap();

        let loaded = FittedPipeline::load(&model_path).unwrap();

        assert_eq!(
            fitted.predict(&rows).unwrap(),
            loaded.predict(&rows).unwrap()
        );
        assert_eq!(fitted.params(), loaded.params());
        assert_eq!(fitted.feature_names(), loaded.feature_names());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("files").join("models").join("model.bin.gz");

        let (fitted, _) = train_simple_pipeline();
        fitted.save(&model_path).unwrap();
        assert!(model_path.exists());
    }

    #[test]
    fn save_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("model.bin.gz");
        std::fs::write(&model_path, b"previous contents").unwrap();

        let (fitted, rows) = train_simple_pipeline();
        fitted.save(&model_path).unwrap();

        let loaded = FittedPipeline::load(&model_path).unwrap();
        assert_eq!(
            fitted.predict(&rows).unwrap(),
            loaded.predict(&rows).unwrap()
        );
    }

    #[test]
    fn saved_file_is_gzip() {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("model.bin.gz");

        let (fitted, _) = train_simple_pipeline();
        fitted.save(&model_path).unwrap();

        let bytes = std::fs::read(&model_path).unwrap();
        assert!(bytes.len() > 2);
        assert_eq!(&bytes[..2], &[0x1f, 0x8b], "missing gzip magic");
    }

    #[test]
    fn load_nonexistent_file_error() {
        let err = FittedPipeline::load("/tmp/nonexistent_model_abc123.bin.gz").unwrap_err();
        assert!(matches!(err, crate::RfError::ReadModel { .. }));
    }

    #[test]
    fn load_non_gzip_file_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.bin.gz");
        std::fs::write(&path, b"not gzip at all").unwrap();
        let err = FittedPipeline::load(&path).unwrap_err();
        assert!(matches!(err, crate::RfError::ReadModel { .. }));
    }

    #[test]
    fn load_gzipped_garbage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.bin.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder =
            flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(b"valid gzip, invalid payload").unwrap();
        encoder.finish().unwrap();

        let err = FittedPipeline::load(&path).unwrap_err();
        assert!(matches!(err, crate::RfError::DeserializeModel { .. }));
    }
}
