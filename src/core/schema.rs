//! Typed feature schema shared by the training and serving paths
//!
//! Every boundary that turns outside data into a [`Sample`](crate::core::Sample)
//! goes through [`FEATURES`]: the CSV loader locates columns by
//! [`FeatureSpec::name`], the HTTP service maps [`FeatureSpec::request_key`]
//! onto it, and the console prompts with [`FeatureSpec::prompt`]. Trained
//! models record the names they were fit with, and the model store refuses
//! artifacts whose names differ.

use thiserror::Error;

/// Number of features every sample carries
pub const N_FEATURES: usize = 8;

/// Name of the label column in tabular input
pub const LABEL_COLUMN: &str = "Diagnosis";

/// Value domain of a single feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureKind {
    /// Real-valued feature bounded below by `min` and above by `max` (inclusive)
    Continuous {
        min: f64,
        max: f64,
        min_exclusive: bool,
    },
    /// Integer-coded feature restricted to a fixed set of levels
    Discrete { allowed: &'static [i64] },
}

/// One named, typed, range-constrained feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSpec {
    /// Column name in the dataset and in trained models
    pub name: &'static str,
    /// Key used in prediction requests
    pub request_key: &'static str,
    /// Console prompt
    pub prompt: &'static str,
    pub kind: FeatureKind,
}

/// Ordered feature schema
pub static FEATURES: [FeatureSpec; N_FEATURES] = [
    FeatureSpec {
        name: "Age",
        request_key: "age",
        prompt: "Age: ",
        kind: FeatureKind::Continuous {
            min: 0.0,
            max: f64::INFINITY,
            min_exclusive: false,
        },
    },
    FeatureSpec {
        name: "Gender",
        request_key: "gender",
        prompt: "Gender (1 for male, 0 for female): ",
        kind: FeatureKind::Discrete { allowed: &[0, 1] },
    },
    FeatureSpec {
        name: "BMI",
        request_key: "bmi",
        prompt: "BMI: ",
        kind: FeatureKind::Continuous {
            min: 0.0,
            max: f64::INFINITY,
            min_exclusive: true,
        },
    },
    FeatureSpec {
        name: "Smoking",
        request_key: "smoking",
        prompt: "Smoking Status (1 for smoker, 0 for non-smoker): ",
        kind: FeatureKind::Discrete { allowed: &[0, 1] },
    },
    FeatureSpec {
        name: "GeneticRisk",
        request_key: "geneticRisk",
        prompt: "Genetic Risk Level (0-2): ",
        kind: FeatureKind::Discrete { allowed: &[0, 1, 2] },
    },
    FeatureSpec {
        name: "PhysicalActivity",
        request_key: "physicalActivity",
        prompt: "Physical Activity (1-10): ",
        kind: FeatureKind::Continuous {
            min: 1.0,
            max: 10.0,
            min_exclusive: false,
        },
    },
    FeatureSpec {
        name: "AlcoholIntake",
        request_key: "alcoholIntake",
        prompt: "Alcohol Intake (1-5): ",
        kind: FeatureKind::Continuous {
            min: 1.0,
            max: 5.0,
            min_exclusive: false,
        },
    },
    FeatureSpec {
        name: "CancerHistory",
        request_key: "cancerHistory",
        prompt: "Family Cancer History (1 for yes, 0 for no): ",
        kind: FeatureKind::Discrete { allowed: &[0, 1] },
    },
];

/// Why a single feature value was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("{field}: '{input}' is not a number")]
    NotANumber { field: &'static str, input: String },

    #[error("{field}: '{input}' is not a whole number")]
    NotAnInteger { field: &'static str, input: String },

    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: String,
    },
}

impl FieldError {
    /// Name of the offending feature
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::NotANumber { field, .. }
            | FieldError::NotAnInteger { field, .. }
            | FieldError::OutOfRange { field, .. } => field,
        }
    }
}

impl FeatureSpec {
    /// Parse raw text and check it against the feature's domain.
    ///
    /// Discrete features must be written as integers, so `"1.0"` is rejected
    /// for `Gender` even though it would pass [`FeatureSpec::check`].
    pub fn parse(&self, raw: &str) -> Result<f64, FieldError> {
        let raw = raw.trim();
        let value = match self.kind {
            FeatureKind::Discrete { .. } => raw
                .parse::<i64>()
                .map(|v| v as f64)
                .map_err(|_| FieldError::NotAnInteger {
                    field: self.name,
                    input: raw.to_string(),
                })?,
            FeatureKind::Continuous { .. } => match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    return Err(FieldError::NotANumber {
                        field: self.name,
                        input: raw.to_string(),
                    })
                }
            },
        };
        self.check(value)
    }

    /// Check an already numeric value against the feature's domain
    pub fn check(&self, value: f64) -> Result<f64, FieldError> {
        let ok = match self.kind {
            FeatureKind::Continuous {
                min,
                max,
                min_exclusive,
            } => {
                let above = if min_exclusive { value > min } else { value >= min };
                value.is_finite() && above && value <= max
            }
            FeatureKind::Discrete { allowed } => {
                value.fract() == 0.0 && allowed.contains(&(value as i64))
            }
        };

        if ok {
            Ok(value)
        } else {
            Err(FieldError::OutOfRange {
                field: self.name,
                value,
                expected: self.describe(),
            })
        }
    }

    /// Human-readable description of the accepted domain
    pub fn describe(&self) -> String {
        match self.kind {
            FeatureKind::Continuous {
                min,
                max,
                min_exclusive,
            } => {
                if max.is_infinite() {
                    if min_exclusive {
                        format!("> {min}")
                    } else {
                        format!(">= {min}")
                    }
                } else {
                    format!("between {min} and {max}")
                }
            }
            FeatureKind::Discrete { allowed } => {
                let levels: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
                format!("one of {}", levels.join(", "))
            }
        }
    }
}

/// Feature names in schema order
pub fn feature_names() -> Vec<String> {
    FEATURES.iter().map(|f| f.name.to_string()).collect()
}

/// Position of a feature by its column name
pub fn index_of(name: &str) -> Option<usize> {
    FEATURES.iter().position(|f| f.name == name)
}

/// Check a full feature vector, reporting the first offending field
pub fn check_all(values: &[f64; N_FEATURES]) -> Result<(), FieldError> {
    for (spec, &value) in FEATURES.iter().zip(values.iter()) {
        spec.check(value)?;
    }
    Ok(())
}
