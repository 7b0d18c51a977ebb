//! The eight numeric inputs of the patient form and how a submission is
//! turned into a [`PatientRecord`].

use crate::models::PatientRecord;
use diabetes_inferences::FeatureColumn;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Integer,
    Decimal { places: usize },
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FormField {
    #[serde(rename = "name")]
    pub column: FeatureColumn,
    pub label: &'static str,
    pub min: f64,
    pub kind: FieldKind,
}

/// Inputs in training column order; the page shows them as two columns of
/// four.
pub const FORM_FIELDS: [FormField; 8] = [
    FormField::integer(FeatureColumn::Pregnancies, "Number of pregnancies"),
    FormField::integer(FeatureColumn::Glucose, "Glucose (mg/dL)"),
    FormField::integer(FeatureColumn::BloodPressure, "Blood pressure (mm Hg)"),
    FormField::integer(FeatureColumn::SkinThickness, "Skin thickness (mm)"),
    FormField::integer(FeatureColumn::Insulin, "Insulin (µU/mL)"),
    FormField::decimal(FeatureColumn::Bmi, "BMI (kg/m²)", 2),
    FormField::decimal(
        FeatureColumn::DiabetesPedigreeFunction,
        "Diabetes pedigree function",
        3,
    ),
    FormField::integer(FeatureColumn::Age, "Age (years)"),
];

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("{label}: {value:?} is not a number")]
    NotANumber { label: &'static str, value: String },

    #[error("{label}: {value} is not a whole number")]
    NotWhole { label: &'static str, value: f64 },

    #[error("{label}: {value} is below the minimum of {min}")]
    BelowMinimum {
        label: &'static str,
        value: f64,
        min: f64,
    },

    #[error("{label}: {value} is too large")]
    TooLarge { label: &'static str, value: f64 },
}

impl FormField {
    const fn integer(column: FeatureColumn, label: &'static str) -> Self {
        Self {
            column,
            label,
            min: 0.0,
            kind: FieldKind::Integer,
        }
    }

    const fn decimal(column: FeatureColumn, label: &'static str, places: usize) -> Self {
        Self {
            column,
            label,
            min: 0.0,
            kind: FieldKind::Decimal { places },
        }
    }

    /// Name of the HTML input, identical to the training column name.
    pub fn name(&self) -> &'static str {
        self.column.name()
    }

    /// Value of the HTML `step` attribute.
    pub fn step(&self) -> String {
        match self.kind {
            FieldKind::Integer => "1".to_string(),
            FieldKind::Decimal { places } => format!("{:.*}", places, 0.1f64.powi(places as i32)),
        }
    }

    pub fn format_value(&self, value: f64) -> String {
        match self.kind {
            FieldKind::Integer => format!("{value:.0}"),
            FieldKind::Decimal { places } => format!("{value:.places$}"),
        }
    }

    /// Parses one submitted value. An empty value means the default, 0.
    pub fn parse(&self, raw: &str) -> Result<f64, FormError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(0.0);
        }
        let value = raw.parse::<f64>().map_err(|_| FormError::NotANumber {
            label: self.label,
            value: raw.to_string(),
        })?;
        self.check(value)?;
        Ok(value)
    }

    /// Enforces the minimum, and whole numbers for integer fields.
    pub fn check(&self, value: f64) -> Result<(), FormError> {
        if !value.is_finite() {
            return Err(FormError::NotANumber {
                label: self.label,
                value: value.to_string(),
            });
        }
        if value < self.min {
            return Err(FormError::BelowMinimum {
                label: self.label,
                value,
                min: self.min,
            });
        }
        if self.kind == FieldKind::Integer {
            if value.fract() != 0.0 {
                return Err(FormError::NotWhole {
                    label: self.label,
                    value,
                });
            }
            if value > f64::from(u32::MAX) {
                return Err(FormError::TooLarge {
                    label: self.label,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Builds a record from submitted `(name, value)` pairs.
///
/// Inputs that were not submitted keep their default of zero. Pairs whose
/// name is not a form field (the submit button, for one) are ignored; when a
/// name repeats, the last value wins.
pub fn collect(pairs: &[(String, String)]) -> Result<PatientRecord, FormError> {
    let mut record = PatientRecord::default();
    for field in &FORM_FIELDS {
        if let Some((_, raw)) = pairs.iter().rev().find(|(name, _)| name == field.name()) {
            record.set(field.column, field.parse(raw)?);
        }
    }
    Ok(record)
}

/// Applies the per-field constraints to a record that did not come through
/// [`collect`], such as a JSON body.
pub fn validate(record: &PatientRecord) -> Result<(), FormError> {
    FORM_FIELDS
        .iter()
        .try_for_each(|field| field.check(record.value(field.column)))
}
