//! Loading and querying of the pretrained diabetes classifier.
//!
//! The artifact is read once with [`InferenceModel::load`]; the resulting
//! handle answers [`InferenceModel::predict`] for rows built from
//! [`FeatureColumn::ALL`].

pub mod error;
pub mod inference;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod types;
pub mod xgboost;

pub use error::{ArtifactLoadError, PredictionError};
pub use inference::{ArtifactFormat, Classifier, InferenceModel, ModelInfo};
pub use types::{FeatureColumn, ModelInput, ModelOutput, FEATURE_COUNT};
pub use xgboost::XgbClassifier;
