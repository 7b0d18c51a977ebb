use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The artifact could not be turned into a usable classifier.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("cannot read model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("model artifact {} is not valid XGBoost JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model artifact {} is malformed: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("ONNX model {} could not be prepared: {reason}", .path.display())]
    Onnx { path: PathBuf, reason: String },

    #[error("unsupported model artifact {} (expected a .json or .onnx file)", .path.display())]
    UnsupportedFormat { path: PathBuf },
}

/// A query against a loaded classifier failed.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("model inference failed: {0}")]
    Inference(String),

    #[error("model returned label {0}, expected 0 or 1")]
    InvalidLabel(i64),

    #[error("model returned probability {0}, expected a value in [0, 1]")]
    InvalidProbability(f64),
}
