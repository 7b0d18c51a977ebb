use diabetes_inferences::{FeatureColumn, ModelInput, ModelOutput};
use serde::{Deserialize, Serialize};

/// The eight measurements entered for one patient.
///
/// Every field defaults to zero, so a submission that leaves inputs untouched
/// is still a complete record.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PatientRecord {
    #[serde(rename = "Pregnancies")]
    pub pregnancies: u32,
    #[serde(rename = "Glucose")]
    pub glucose: u32,
    #[serde(rename = "BloodPressure")]
    pub blood_pressure: u32,
    #[serde(rename = "SkinThickness")]
    pub skin_thickness: u32,
    #[serde(rename = "Insulin")]
    pub insulin: u32,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "DiabetesPedigreeFunction")]
    pub diabetes_pedigree_function: f64,
    #[serde(rename = "Age")]
    pub age: u32,
}

impl PatientRecord {
    pub fn value(&self, column: FeatureColumn) -> f64 {
        match column {
            FeatureColumn::Pregnancies => f64::from(self.pregnancies),
            FeatureColumn::Glucose => f64::from(self.glucose),
            FeatureColumn::BloodPressure => f64::from(self.blood_pressure),
            FeatureColumn::SkinThickness => f64::from(self.skin_thickness),
            FeatureColumn::Insulin => f64::from(self.insulin),
            FeatureColumn::Bmi => self.bmi,
            FeatureColumn::DiabetesPedigreeFunction => self.diabetes_pedigree_function,
            FeatureColumn::Age => f64::from(self.age),
        }
    }

    /// Stores `value` in the field behind `column`. Integer fields expect a
    /// whole, non-negative value that fits in `u32`; the form checks this.
    pub fn set(&mut self, column: FeatureColumn, value: f64) {
        let whole = value as u32;
        match column {
            FeatureColumn::Pregnancies => self.pregnancies = whole,
            FeatureColumn::Glucose => self.glucose = whole,
            FeatureColumn::BloodPressure => self.blood_pressure = whole,
            FeatureColumn::SkinThickness => self.skin_thickness = whole,
            FeatureColumn::Insulin => self.insulin = whole,
            FeatureColumn::Bmi => self.bmi = value,
            FeatureColumn::DiabetesPedigreeFunction => self.diabetes_pedigree_function = value,
            FeatureColumn::Age => self.age = whole,
        }
    }

    /// Row handed to the classifier, in training column order.
    pub fn to_model_input(&self) -> ModelInput {
        ModelInput::from_columns(|column| self.value(column) as f32)
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Success,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PredictionResult {
    pub label: u8,
    pub probability: f64,
    pub probability_percent: String,
    pub severity: Severity,
    pub message: String,
    pub timestamp: String,
}

impl PredictionResult {
    pub fn new(output: ModelOutput) -> Self {
        let probability_percent = format!("{:.2}%", output.probability * 100.0);
        let (severity, verdict) = if output.label == 1 {
            (Severity::Warning, "Patient is potentially diabetic")
        } else {
            (Severity::Success, "Patient is not potentially diabetic")
        };

        PredictionResult {
            label: output.label,
            probability: output.probability,
            message: format!("{verdict} (Probability: {probability_percent})"),
            probability_percent,
            severity,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_diabetic(&self) -> bool {
        self.label == 1
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: String,
    pub execution_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
            execution_time_ms: None,
        }
    }

    pub fn timed(mut self, started: std::time::Instant) -> Self {
        self.execution_time_ms = Some(started.elapsed().as_millis() as u64);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reference_case() -> PatientRecord {
        PatientRecord {
            pregnancies: 6,
            glucose: 148,
            blood_pressure: 72,
            skin_thickness: 35,
            insulin: 0,
            bmi: 33.6,
            diabetes_pedigree_function: 0.627,
            age: 50,
        }
    }

    #[test]
    fn model_input_uses_training_column_order() {
        let record = PatientRecord {
            pregnancies: 1,
            glucose: 2,
            blood_pressure: 3,
            skin_thickness: 4,
            insulin: 5,
            bmi: 6.0,
            diabetes_pedigree_function: 7.0,
            age: 8,
        };
        assert_eq!(
            record.to_model_input().as_slice(),
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
        );
    }

    #[test]
    fn json_keys_are_training_column_names() {
        let json = serde_json::to_value(reference_case()).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        let mut expected = FeatureColumn::names();
        keys.sort_unstable();
        expected.sort_unstable();
        assert_eq!(keys, expected);
    }

    #[test]
    fn missing_json_fields_default_to_zero() {
        let record: PatientRecord = serde_json::from_str(r#"{"Glucose": 120}"#).unwrap();
        assert_eq!(
            record,
            PatientRecord {
                glucose: 120,
                ..PatientRecord::default()
            }
        );
    }

    #[test]
    fn unknown_json_fields_are_rejected() {
        let parsed = serde_json::from_str::<PatientRecord>(r#"{"Bmi": 30.0}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn negative_integers_are_rejected_by_the_type() {
        let parsed = serde_json::from_str::<PatientRecord>(r#"{"Age": -1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn set_and_value_agree_for_every_column() {
        let mut record = PatientRecord::default();
        for column in FeatureColumn::ALL {
            record.set(column, 3.0);
        }
        for column in FeatureColumn::ALL {
            assert_eq!(record.value(column), 3.0);
        }
    }

    #[test]
    fn positive_label_renders_warning() {
        let result = PredictionResult::new(ModelOutput {
            label: 1,
            probability: 0.7246,
        });
        assert_eq!(result.severity, Severity::Warning);
        assert_eq!(result.probability, 0.7246);
        assert_eq!(
            result.message,
            "Patient is potentially diabetic (Probability: 72.46%)"
        );
        assert!(result.is_diabetic());
    }

    #[test]
    fn negative_label_renders_success() {
        let result = PredictionResult::new(ModelOutput {
            label: 0,
            probability: 0.05,
        });
        assert_eq!(result.severity, Severity::Success);
        assert_eq!(result.probability_percent, "5.00%");
        assert_eq!(
            result.message,
            "Patient is not potentially diabetic (Probability: 5.00%)"
        );
    }
}
