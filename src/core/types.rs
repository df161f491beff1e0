//! Core type definitions for the cancer-risk pipeline

use crate::core::error::{OncoError, Result};
use crate::core::schema::{self, FEATURES, N_FEATURES};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Binary diagnosis label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    /// No cancer (0)
    Negative,
    /// Cancer (1)
    Positive,
}

impl Label {
    /// Index used for confusion-matrix rows/columns and class counts
    pub fn index(self) -> usize {
        match self {
            Label::Negative => 0,
            Label::Positive => 1,
        }
    }

    /// Numeric encoding (0 or 1)
    pub fn as_u8(self) -> u8 {
        self.index() as u8
    }

    /// Decode a numeric label, accepting only 0 and 1
    pub fn from_value(value: f64) -> Result<Self> {
        if value == 0.0 {
            Ok(Label::Negative)
        } else if value == 1.0 {
            Ok(Label::Positive)
        } else {
            Err(OncoError::InvalidLabel(value))
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// One row of the fixed feature schema with an optional diagnosis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Feature values in [`FEATURES`] order
    pub features: [f64; N_FEATURES],
    pub label: Option<Label>,
}

impl Sample {
    /// Create a labeled sample
    pub fn new(features: [f64; N_FEATURES], label: Label) -> Self {
        Self {
            features,
            label: Some(label),
        }
    }

    /// Create a sample without a diagnosis, as received for prediction
    pub fn unlabeled(features: [f64; N_FEATURES]) -> Self {
        Self {
            features,
            label: None,
        }
    }

    /// Build an unlabeled sample from `(name, value)` pairs.
    ///
    /// The pairs must name exactly the schema features in schema order.
    pub fn from_named<S: AsRef<str>>(pairs: &[(S, f64)]) -> Result<Self> {
        let names_match = pairs.len() == N_FEATURES
            && pairs
                .iter()
                .zip(FEATURES.iter())
                .all(|((name, _), spec)| name.as_ref() == spec.name);

        if !names_match {
            return Err(OncoError::SchemaMismatch {
                expected: schema::feature_names(),
                actual: pairs.iter().map(|(n, _)| n.as_ref().to_string()).collect(),
            });
        }

        let mut features = [0.0; N_FEATURES];
        for (slot, (_, value)) in features.iter_mut().zip(pairs.iter()) {
            *slot = *value;
        }
        Ok(Self::unlabeled(features))
    }

    /// Value of a feature by column name
    pub fn get(&self, name: &str) -> Option<f64> {
        schema::index_of(name).map(|i| self.features[i])
    }
}

/// Prediction result containing label and positive-class probability
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Majority-vote label
    pub label: Label,
    /// Fraction of trees voting positive
    pub probability: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(label: Label, probability: f64) -> Self {
        Self { label, probability }
    }

    /// Share of trees agreeing with the returned label
    pub fn confidence(&self) -> f64 {
        match self.label {
            Label::Positive => self.probability,
            Label::Negative => 1.0 - self.probability,
        }
    }
}
