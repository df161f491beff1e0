//! Single-sample prediction and the shared, reloadable model slot
//!
//! The server and the interactive prompt both go through [`ModelSlot`]:
//! readers clone an `Arc` to the current model and drop the lock before
//! inference, and a reload only swaps the reference once the replacement
//! has loaded completely.

use crate::api::TrainedModel;
use crate::core::{schema, Label, OncoError, Result, Sample};
use crate::persistence::load_model;
use log::{error, info, warn};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Predict the diagnosis for one sample.
///
/// Fails with `SchemaMismatch` if the model was bound to a different feature
/// list than the one samples are built from.
pub fn predict(model: &TrainedModel, sample: &Sample) -> Result<Label> {
    let expected = schema::feature_names();
    if model.feature_names() != expected.as_slice() {
        return Err(OncoError::SchemaMismatch {
            expected,
            actual: model.feature_names().to_vec(),
        });
    }
    Ok(model.predict(sample).label)
}

#[derive(Debug)]
enum Slot {
    Loaded(Arc<TrainedModel>),
    /// No usable model; holds the reason reported to callers
    Unavailable(String),
}

/// Holder for the model currently used to answer predictions
#[derive(Debug)]
pub struct ModelSlot {
    inner: RwLock<Slot>,
}

impl ModelSlot {
    /// A slot with no model
    pub fn empty(reason: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Slot::Unavailable(reason.into())),
        }
    }

    pub fn with_model(model: TrainedModel) -> Self {
        Self {
            inner: RwLock::new(Slot::Loaded(Arc::new(model))),
        }
    }

    /// Load the artifact at `path`. A failure is logged and leaves the slot
    /// empty, so the process can still start and report the problem per request.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match load_model(path) {
            Ok(model) => Self::with_model(model),
            Err(e) => {
                error!("Error loading model from {}: {}", path.display(), e);
                Self::empty(format!("Model could not be loaded: {e}"))
            }
        }
    }

    /// The current model, or `ModelUnavailable`
    pub fn current(&self) -> Result<Arc<TrainedModel>> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        match &*guard {
            Slot::Loaded(model) => Ok(Arc::clone(model)),
            Slot::Unavailable(reason) => Err(OncoError::ModelUnavailable(reason.clone())),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(
            &*self.inner.read().unwrap_or_else(|e| e.into_inner()),
            Slot::Loaded(_)
        )
    }

    /// Replace the current model, returning the previous one if any
    pub fn swap(&self, model: TrainedModel) -> Option<Arc<TrainedModel>> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match std::mem::replace(&mut *guard, Slot::Loaded(Arc::new(model))) {
            Slot::Loaded(old) => Some(old),
            Slot::Unavailable(_) => None,
        }
    }

    /// Load a new model from `path` and swap it in. On failure the current
    /// model (if any) stays in place and the error is returned.
    pub fn reload<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        match load_model(path) {
            Ok(model) => {
                self.swap(model);
                info!("Reloaded model from {}", path.display());
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Reload from {} failed, keeping current model: {}",
                    path.display(),
                    e
                );
                Err(e)
            }
        }
    }

    /// Predict with the current model
    pub fn predict(&self, sample: &Sample) -> Result<Label> {
        let model = self.current()?;
        predict(&model, sample)
    }
}
