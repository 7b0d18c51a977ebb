use crate::error::{ArtifactLoadError, PredictionError};
use crate::types::{FeatureColumn, ModelInput, ModelOutput, FEATURE_COUNT};
use crate::xgboost::XgbClassifier;
use log::{debug, info};
use serde::Serialize;
use std::path::Path;

/// A pretrained binary classifier over one [`ModelInput`] row.
pub trait Classifier: Send + Sync {
    /// Predicted class label.
    fn predict(&self, input: &ModelInput) -> Result<i64, PredictionError> {
        let [negative, positive] = self.predict_proba(input)?;
        Ok(if positive > negative { 1 } else { 0 })
    }

    /// Class probabilities `[p(label = 0), p(label = 1)]`.
    fn predict_proba(&self, input: &ModelInput) -> Result<[f64; 2], PredictionError>;

    /// Label and class probabilities for one row. Backends that answer both
    /// from a single evaluation override this.
    fn classify(&self, input: &ModelInput) -> Result<(i64, [f64; 2]), PredictionError> {
        Ok((self.predict(input)?, self.predict_proba(input)?))
    }

    /// Short human readable description of the backend.
    fn detail(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Xgboost,
    Onnx,
    /// Classifier supplied directly by the embedding program.
    InMemory,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub source: String,
    pub format: ArtifactFormat,
    pub input_shape: Vec<usize>,
    pub features: Vec<&'static str>,
    pub detail: String,
}

/// The loaded classifier. Immutable once built; share it behind an `Arc`.
pub struct InferenceModel {
    classifier: Box<dyn Classifier>,
    info: ModelInfo,
}

impl InferenceModel {
    /// Reads the artifact at `model_path` and builds the matching backend.
    ///
    /// The artifact file is only held open while it is being parsed.
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, ArtifactLoadError> {
        let path = model_path.as_ref();
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_ascii_lowercase);

        let (classifier, format): (Box<dyn Classifier>, _) = match extension.as_deref() {
            Some("json") => (Box::new(XgbClassifier::load(path)?), ArtifactFormat::Xgboost),
            Some("onnx") => (load_onnx(path)?, ArtifactFormat::Onnx),
            _ => {
                return Err(ArtifactLoadError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        let model = Self::with_info(classifier, path.display().to_string(), format);
        info!("Loaded {} from {}", model.info.detail, model.info.source);
        Ok(model)
    }

    /// Wraps a classifier that was built without an artifact file.
    pub fn from_classifier<C>(classifier: C, source: impl Into<String>) -> Self
    where
        C: Classifier + 'static,
    {
        Self::with_info(Box::new(classifier), source.into(), ArtifactFormat::InMemory)
    }

    fn with_info(classifier: Box<dyn Classifier>, source: String, format: ArtifactFormat) -> Self {
        let info = ModelInfo {
            source,
            format,
            input_shape: vec![1, FEATURE_COUNT],
            features: FeatureColumn::names(),
            detail: classifier.detail(),
        };
        Self { classifier, info }
    }

    /// Runs both classifier queries for one row and checks their contract.
    pub fn predict(&self, input: &ModelInput) -> Result<ModelOutput, PredictionError> {
        let (label, [_, probability]) = self.classifier.classify(input)?;
        let label = match label {
            0 => 0,
            1 => 1,
            other => return Err(PredictionError::InvalidLabel(other)),
        };
        if !(0.0..=1.0).contains(&probability) {
            return Err(PredictionError::InvalidProbability(probability));
        }
        debug!("Model answered label={} probability={:.4}", label, probability);
        Ok(ModelOutput { label, probability })
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &Path) -> Result<Box<dyn Classifier>, ArtifactLoadError> {
    Ok(Box::new(crate::onnx::OnnxClassifier::load(path)?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &Path) -> Result<Box<dyn Classifier>, ArtifactLoadError> {
    Err(ArtifactLoadError::Onnx {
        path: path.to_path_buf(),
        reason: "built without the `onnx` feature".to_string(),
    })
}
