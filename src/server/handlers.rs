//! Request handlers

use super::{error::ApiError, state::AppState};
use crate::core::{Sample, FEATURES, N_FEATURES};
use axum::{body::Bytes, extract::State, Json};
use log::{debug, info};
use serde_json::{json, Map, Value};
use std::sync::Arc;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Turn a request object into a sample.
///
/// Reports every missing key at once, in schema order. Values may be JSON
/// numbers or numeric strings; anything else is an internal error.
fn sample_from_body(body: &Map<String, Value>) -> ApiResult<Sample> {
    let missing: Vec<&'static str> = FEATURES
        .iter()
        .map(|spec| spec.request_key)
        .filter(|key| !body.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }

    let mut features = [0.0; N_FEATURES];
    for (slot, spec) in features.iter_mut().zip(FEATURES.iter()) {
        let raw = &body[spec.request_key];
        let value = match raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            ApiError::Internal(format!(
                "could not convert {} value {} to a number",
                spec.request_key, raw
            ))
        })?;

        *slot = spec.check(value)?;
    }

    Ok(Sample::unlabeled(features))
}

pub async fn predict(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Json<Value>> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;
    debug!("Received data: {}", payload);

    let object = payload
        .as_object()
        .ok_or_else(|| ApiError::BadRequest("Request body must be a JSON object".to_string()))?;

    let sample = sample_from_body(object)?;
    debug!("Processed input data: {:?}", sample.features);

    let label = state.model.predict(&sample)?;
    info!("Prediction result: {}", label);

    Ok(Json(json!({ "prediction": label.as_u8() })))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model_loaded": state.model.is_loaded(),
    }))
}

/// Re-read the artifact off the async workers; decoding a large forest blocks.
pub async fn reload(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let worker = Arc::clone(&state);
    tokio::task::spawn_blocking(move || worker.model.reload(&worker.config.model_path))
        .await
        .map_err(|e| ApiError::Internal(format!("Reload task failed: {e}")))??;
    Ok(Json(json!({
        "status": "reloaded",
        "model_path": state.config.model_path.display().to_string(),
    })))
}
