use crate::error::{ArtifactLoadError, PredictionError};
use crate::inference::Classifier;
use crate::types::{ModelInput, FEATURE_COUNT};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tract_onnx::prelude::*;

type Plan = TypedRunnableModel<TypedModel>;

/// ONNX binary classifier run with tract.
///
/// Accepts the usual converter layouts: `(label, probabilities)` outputs, a
/// single `[1, 2]` probability output, or a single class-1 probability.
pub struct OnnxClassifier {
    model: Plan,
    outputs: usize,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path) -> Result<Self, ArtifactLoadError> {
        let failed = |e: TractError| ArtifactLoadError::Onnx {
            path: model_path.to_path_buf(),
            reason: format!("{e:#}"),
        };

        let file = File::open(model_path).map_err(|source| ArtifactLoadError::Io {
            path: model_path.to_path_buf(),
            source,
        })?;
        let graph = tract_onnx::onnx()
            .model_for_read(&mut BufReader::new(file))
            .map_err(failed)?;

        let outputs = graph.output_outlets().map_err(failed)?.len();
        let model = graph
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, FEATURE_COUNT)),
            )
            .and_then(|graph| graph.into_optimized())
            .and_then(|graph| graph.into_runnable())
            .map_err(failed)?;

        Ok(Self { model, outputs })
    }

    /// Runs the graph once and reads label and probabilities from it.
    fn run(&self, input: &ModelInput) -> TractResult<(i64, [f64; 2])> {
        let tensor = Tensor::from_shape(&[1, FEATURE_COUNT], input.as_slice())?;
        let outputs = self.model.run(tvec!(tensor.into()))?;

        let labels = if self.outputs >= 2 {
            let labels = outputs[0].cast_to::<i64>()?;
            Some(labels.as_slice::<i64>()?.to_vec())
        } else {
            None
        };
        let slot = if self.outputs >= 2 { 1 } else { 0 };
        let scores = outputs[slot].cast_to::<f32>()?;
        let scores = scores.as_slice::<f32>()?;

        read_outputs(labels.as_deref(), scores).map_err(|reason| anyhow::anyhow!(reason))
    }
}

/// Interprets the raw graph outputs of a binary classifier.
///
/// `labels` is the first output when the graph has a label output. `scores`
/// holds either both class probabilities or only the class-1 probability.
/// Without a label output the likelier class wins, ties going to 0.
fn read_outputs(labels: Option<&[i64]>, scores: &[f32]) -> Result<(i64, [f64; 2]), String> {
    let probabilities = match scores {
        [positive] => [1.0 - f64::from(*positive), f64::from(*positive)],
        [negative, positive] => [f64::from(*negative), f64::from(*positive)],
        other => {
            return Err(format!(
                "expected 1 or 2 probability values, got {}",
                other.len()
            ))
        }
    };
    let label = match labels {
        Some(labels) => *labels
            .first()
            .ok_or_else(|| "model produced no label".to_string())?,
        None if probabilities[1] > probabilities[0] => 1,
        None => 0,
    };
    Ok((label, probabilities))
}

impl Classifier for OnnxClassifier {
    fn predict(&self, input: &ModelInput) -> Result<i64, PredictionError> {
        self.classify(input).map(|(label, _)| label)
    }

    fn predict_proba(&self, input: &ModelInput) -> Result<[f64; 2], PredictionError> {
        self.classify(input).map(|(_, probabilities)| probabilities)
    }

    fn classify(&self, input: &ModelInput) -> Result<(i64, [f64; 2]), PredictionError> {
        self.run(input)
            .map_err(|e| PredictionError::Inference(format!("{e:#}")))
    }

    fn detail(&self) -> String {
        format!("ONNX classifier ({} outputs)", self.outputs)
    }
}
