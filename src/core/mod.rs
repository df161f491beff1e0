//! Core types, schema and traits for the cancer-risk pipeline

pub mod error;
pub mod schema;
pub mod traits;
pub mod types;

pub use self::error::*;
pub use self::schema::{FeatureKind, FeatureSpec, FieldError, FEATURES, LABEL_COLUMN, N_FEATURES};
pub use self::traits::*;
pub use self::types::*;
