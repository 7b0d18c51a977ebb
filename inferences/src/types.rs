use serde::Serialize;
use std::fmt;

/// Number of features the classifier was trained on.
pub const FEATURE_COUNT: usize = 8;

/// Input columns of the classifier, in training order.
///
/// The model does not check names at prediction time, so every place that
/// builds a feature vector iterates [`FeatureColumn::ALL`] instead of
/// listing fields by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FeatureColumn {
    Pregnancies,
    Glucose,
    BloodPressure,
    SkinThickness,
    Insulin,
    #[serde(rename = "BMI")]
    Bmi,
    DiabetesPedigreeFunction,
    Age,
}

impl FeatureColumn {
    pub const ALL: [FeatureColumn; FEATURE_COUNT] = [
        FeatureColumn::Pregnancies,
        FeatureColumn::Glucose,
        FeatureColumn::BloodPressure,
        FeatureColumn::SkinThickness,
        FeatureColumn::Insulin,
        FeatureColumn::Bmi,
        FeatureColumn::DiabetesPedigreeFunction,
        FeatureColumn::Age,
    ];

    /// Column name as it appears in the training data.
    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::Pregnancies => "Pregnancies",
            FeatureColumn::Glucose => "Glucose",
            FeatureColumn::BloodPressure => "BloodPressure",
            FeatureColumn::SkinThickness => "SkinThickness",
            FeatureColumn::Insulin => "Insulin",
            FeatureColumn::Bmi => "BMI",
            FeatureColumn::DiabetesPedigreeFunction => "DiabetesPedigreeFunction",
            FeatureColumn::Age => "Age",
        }
    }

    /// Position of the column in the model input.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.name() == name)
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|column| column.name()).collect()
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of classifier input, laid out in [`FeatureColumn::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelInput {
    features: [f32; FEATURE_COUNT],
}

impl ModelInput {
    /// Builds the row by asking for each column in training order.
    pub fn from_columns<F>(mut value_of: F) -> Self
    where
        F: FnMut(FeatureColumn) -> f32,
    {
        let mut features = [0.0; FEATURE_COUNT];
        for column in FeatureColumn::ALL {
            features[column.index()] = value_of(column);
        }
        Self { features }
    }

    pub fn get(&self, column: FeatureColumn) -> f32 {
        self.features[column.index()]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.features
    }
}

impl From<[f32; FEATURE_COUNT]> for ModelInput {
    fn from(features: [f32; FEATURE_COUNT]) -> Self {
        Self { features }
    }
}

/// Answer of the classifier for one row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelOutput {
    /// 1 when the patient is predicted diabetic, 0 otherwise.
    pub label: u8,
    /// Probability of label 1, as returned by the model.
    pub probability: f64,
}
