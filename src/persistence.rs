//! Model serialization and persistence
//!
//! A model artifact is a single binary file: the 4-byte magic `ONCF`, a
//! little-endian `u32` format version, then the bincode-encoded
//! [`SerializableModel`]. Saving writes a sibling temporary file and renames
//! it over the destination, so readers never observe a half-written artifact.

use crate::api::TrainedModel;
use crate::core::{schema, Classifier, OncoError, Result, N_FEATURES};
use crate::forest::{ForestConfig, TrainedForest};
use bincode::Options;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Leading bytes of every artifact
pub const MAGIC: [u8; 4] = *b"ONCF";

/// Current artifact layout version
pub const FORMAT_VERSION: u32 = 1;

/// Upper bound on a decoded payload
const PAYLOAD_LIMIT: u64 = 256 * 1024 * 1024;

const HEADER_LEN: usize = MAGIC.len() + std::mem::size_of::<u32>();

/// Serializable representation of a trained forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableModel {
    pub forest: TrainedForest,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Model metadata for tracking and validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Feature names in the order the forest expects them
    pub feature_names: Vec<String>,
    /// Training parameters used
    pub training_params: ForestConfig,
    pub n_trees: usize,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(PAYLOAD_LIMIT)
        .reject_trailing_bytes()
}

impl SerializableModel {
    /// Create a serializable model from a trained model
    pub fn from_trained_model(model: &TrainedModel) -> Self {
        Self {
            forest: model.inner().clone(),
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                feature_names: model.feature_names().to_vec(),
                training_params: model.config().clone(),
                n_trees: model.inner().n_trees(),
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Encode header and payload
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = codec()
            .serialize(self)
            .map_err(|e| OncoError::CorruptArtifact(format!("Cannot encode model: {e}")))?;

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }

    /// Decode an artifact, checking magic, version and payload
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN || bytes[..MAGIC.len()] != MAGIC {
            return Err(OncoError::CorruptArtifact(
                "missing ONCF header".to_string(),
            ));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[MAGIC.len()..HEADER_LEN]);
        let version = u32::from_le_bytes(version);
        if version != FORMAT_VERSION {
            return Err(OncoError::CorruptArtifact(format!(
                "unsupported format version {version} (expected {FORMAT_VERSION})"
            )));
        }

        codec()
            .deserialize(&bytes[HEADER_LEN..])
            .map_err(|e| OncoError::CorruptArtifact(format!("invalid payload: {e}")))
    }

    /// Save model to file, replacing any existing artifact
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;

        let tmp = temp_path(path);
        fs::write(&tmp, &bytes)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| OncoError::from_open(path, e))?;
        Self::from_bytes(&bytes)
    }

    /// Convert back to a trained model, checking the bound feature schema
    pub fn to_trained_model(&self) -> Result<TrainedModel> {
        let expected = schema::feature_names();
        if self.metadata.feature_names != expected {
            return Err(OncoError::CorruptArtifact(format!(
                "artifact features {:?} do not match {:?}",
                self.metadata.feature_names, expected
            )));
        }
        if self.forest.n_trees() == 0 {
            return Err(OncoError::CorruptArtifact(
                "artifact holds no trees".to_string(),
            ));
        }
        let n_importances = self.forest.feature_importances().len();
        if n_importances != N_FEATURES {
            return Err(OncoError::CorruptArtifact(format!(
                "artifact holds {n_importances} feature importances, expected {N_FEATURES}"
            )));
        }
        for (i, tree) in self.forest.trees().iter().enumerate() {
            tree.validate().map_err(|e| match e {
                OncoError::CorruptArtifact(msg) => {
                    OncoError::CorruptArtifact(format!("tree {i}: {msg}"))
                }
                other => other,
            })?;
        }

        Ok(TrainedModel::from_parts(
            self.forest.clone(),
            self.metadata.feature_names.clone(),
            self.metadata.training_params.clone(),
        ))
    }

    /// Print model summary
    pub fn print_summary(&self) {
        let params = &self.metadata.training_params;
        println!("=== Random Forest Model Summary ===");
        println!("Trees: {}", self.metadata.n_trees);
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Features: {}", self.metadata.feature_names.join(", "));
        println!("Training Parameters:");
        println!("  Trees: {}", params.n_trees);
        match params.max_depth {
            Some(depth) => println!("  Max Depth: {depth}"),
            None => println!("  Max Depth: unbounded"),
        }
        println!("  Seed: {}", params.seed);
        println!("  Max Features: {:?}", params.max_features);
        println!("  Min Samples Split: {}", params.min_samples_split);
        println!("  Min Samples Leaf: {}", params.min_samples_leaf);
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Save a trained model to `path`
pub fn save_model<P: AsRef<Path>>(model: &TrainedModel, path: P) -> Result<()> {
    SerializableModel::from_trained_model(model).save_to_file(&path)?;
    info!("Model saved at {}", path.as_ref().display());
    Ok(())
}

/// Load a trained model from `path`
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<TrainedModel> {
    let model = SerializableModel::load_from_file(&path)?.to_trained_model()?;
    info!("Model loaded from {}", path.as_ref().display());
    Ok(model)
}
