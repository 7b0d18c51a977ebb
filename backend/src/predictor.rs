use crate::models::{PatientRecord, PredictionResult};
use diabetes_inferences::{InferenceModel, PredictionError};
use log::info;

/// Asks the loaded model about one record.
///
/// Holds no state between calls: the same record against the same model
/// always gives the same label and probability.
pub fn predict(
    model: &InferenceModel,
    record: &PatientRecord,
) -> Result<PredictionResult, PredictionError> {
    let output = model.predict(&record.to_model_input())?;
    info!(
        "Prediction: label={} probability={:.3}",
        output.label, output.probability
    );
    Ok(PredictionResult::new(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use diabetes_inferences::{Classifier, ModelInput};

    /// Probability grows with glucose; label follows the 0.5 cut.
    struct GlucoseOnly;

    impl Classifier for GlucoseOnly {
        fn predict_proba(&self, input: &ModelInput) -> Result<[f64; 2], PredictionError> {
            let glucose = f64::from(input.as_slice()[1]);
            let positive = (glucose / 200.0).min(1.0);
            Ok([1.0 - positive, positive])
        }

        fn detail(&self) -> String {
            "glucose only".to_string()
        }
    }

    struct Broken;

    impl Classifier for Broken {
        fn predict_proba(&self, _input: &ModelInput) -> Result<[f64; 2], PredictionError> {
            Err(PredictionError::Inference("type mismatch".to_string()))
        }

        fn detail(&self) -> String {
            "broken".to_string()
        }
    }

    #[test]
    fn high_glucose_is_flagged() {
        let model = InferenceModel::from_classifier(GlucoseOnly, "test");
        let record = PatientRecord {
            glucose: 180,
            ..PatientRecord::default()
        };
        let result = predict(&model, &record).unwrap();
        assert_eq!(result.label, 1);
        assert_eq!(result.severity, Severity::Warning);
        assert_eq!(result.probability, 0.9);
        assert_eq!(result.probability_percent, "90.00%");
    }

    #[test]
    fn all_zero_record_predicts() {
        let model = InferenceModel::from_classifier(GlucoseOnly, "test");
        let result = predict(&model, &PatientRecord::default()).unwrap();
        assert_eq!(result.label, 0);
        assert_eq!(result.severity, Severity::Success);
        assert_eq!(result.probability, 0.0);
    }

    #[test]
    fn model_failure_is_returned() {
        let model = InferenceModel::from_classifier(Broken, "test");
        let err = predict(&model, &PatientRecord::default()).unwrap_err();
        assert!(err.to_string().contains("type mismatch"));
    }
}
