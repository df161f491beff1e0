//! HTTP prediction service tests, driven through the router without a socket

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use oncoforest::api::RandomForest;
use oncoforest::core::{Label, Sample, N_FEATURES};
use oncoforest::persistence::save_model;
use oncoforest::predict::{predict, ModelSlot};
use oncoforest::server::{create_router, AppState, ServerConfig};
use oncoforest::TrainedModel;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

fn samples() -> Vec<Sample> {
    (0..80)
        .map(|i| {
            let genetic = (i % 3) as f64;
            let history = ((i / 3) % 2) as f64;
            let label = if genetic == 2.0 || history == 1.0 {
                Label::Positive
            } else {
                Label::Negative
            };
            let features: [f64; N_FEATURES] = [
                25.0 + i as f64,
                (i % 2) as f64,
                20.0 + (i % 10) as f64,
                ((i / 2) % 2) as f64,
                genetic,
                1.0 + (i % 9) as f64,
                1.0 + (i % 4) as f64,
                history,
            ];
            Sample::new(features, label)
        })
        .collect()
}

fn train(seed: u64) -> TrainedModel {
    RandomForest::new()
        .with_n_trees(20)
        .with_seed(seed)
        .train_samples(&samples())
        .expect("Training should succeed")
}

fn config(model_path: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        model_path,
        request_timeout: Duration::from_secs(2),
    }
}

fn router_with(slot: ModelSlot, model_path: PathBuf) -> Router {
    create_router(Arc::new(AppState::new(config(model_path), slot)))
}

fn full_request() -> Value {
    json!({
        "age": 52,
        "gender": 1,
        "bmi": 27.5,
        "smoking": 0,
        "geneticRisk": 2,
        "physicalActivity": 4.5,
        "alcoholIntake": 3.0,
        "cancerHistory": 1
    })
}

async fn send(app: Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn post_predict(app: Router, body: &Value) -> (StatusCode, Value) {
    send(app, "POST", "/predict", Some(body.to_string())).await
}

#[tokio::test]
async fn test_predict_returns_label() {
    let model = train(42);
    let expected = {
        let sample = Sample::unlabeled([52.0, 1.0, 27.5, 0.0, 2.0, 4.5, 3.0, 1.0]);
        predict(&model, &sample).unwrap()
    };
    let app = router_with(ModelSlot::with_model(model), PathBuf::from("unused.bin"));

    let (status, body) = post_predict(app, &full_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "prediction": expected.as_u8() }));
    assert_eq!(expected, Label::Positive);
}

#[tokio::test]
async fn test_predict_is_deterministic_across_training_runs() {
    let a = router_with(ModelSlot::with_model(train(7)), PathBuf::from("unused.bin"));
    let b = router_with(ModelSlot::with_model(train(7)), PathBuf::from("unused.bin"));

    for age in [30, 45, 60, 80] {
        let mut request = full_request();
        request["age"] = json!(age);
        request["geneticRisk"] = json!(0);
        request["cancerHistory"] = json!(0);

        let (status_a, body_a) = post_predict(a.clone(), &request).await;
        let (status_b, body_b) = post_predict(b.clone(), &request).await;
        assert_eq!(status_a, StatusCode::OK);
        assert_eq!(status_b, StatusCode::OK);
        assert_eq!(body_a, body_b);
    }
}

#[tokio::test]
async fn test_missing_single_field() {
    let app = router_with(ModelSlot::with_model(train(42)), PathBuf::from("unused.bin"));

    let mut request = full_request();
    request.as_object_mut().unwrap().remove("physicalActivity");

    let (status, body) = post_predict(app, &request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Missing required fields: physicalActivity" })
    );
}

#[tokio::test]
async fn test_missing_fields_listed_in_schema_order() {
    let app = router_with(ModelSlot::with_model(train(42)), PathBuf::from("unused.bin"));

    let (status, body) = post_predict(app, &json!({ "age": 50, "smoking": 1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Missing required fields: gender, bmi, geneticRisk, physicalActivity, alcoholIntake, cancerHistory"
    );
}

#[tokio::test]
async fn test_out_of_range_value() {
    let app = router_with(ModelSlot::with_model(train(42)), PathBuf::from("unused.bin"));

    let mut request = full_request();
    request["gender"] = json!(3);
    let (status, body) = post_predict(app, &request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Gender"));
}

#[tokio::test]
async fn test_non_numeric_value_is_server_error() {
    let app = router_with(ModelSlot::with_model(train(42)), PathBuf::from("unused.bin"));

    let mut request = full_request();
    request["bmi"] = json!("heavy");
    let (status, body) = post_predict(app, &request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_json() {
    let app = router_with(ModelSlot::with_model(train(42)), PathBuf::from("unused.bin"));
    let (status, body) = send(app, "POST", "/predict", Some("{not json".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON body"));
}

#[tokio::test]
async fn test_unavailable_model() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.bin");
    let app = router_with(ModelSlot::load(&missing), missing);

    let (status, body) = post_predict(app.clone(), &full_request()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("Model unavailable"));

    let (status, body) = send(app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "model_loaded": false }));
}

#[tokio::test]
async fn test_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.bin");
    let app = router_with(ModelSlot::load(&path), path.clone());

    // Nothing to load yet
    let (status, _) = send(app.clone(), "POST", "/reload", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    save_model(&train(42), &path).unwrap();
    let (status, body) = send(app.clone(), "POST", "/reload", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "reloaded");

    let (_, body) = send(app.clone(), "GET", "/health", None).await;
    assert_eq!(body["model_loaded"], true);

    // A broken artifact keeps the current model serving
    std::fs::write(&path, b"garbage").unwrap();
    let (status, _) = send(app.clone(), "POST", "/reload", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, body) = post_predict(app, &full_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 1);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = router_with(ModelSlot::empty("no model"), PathBuf::from("unused.bin"));
    let (status, body) = send(app, "GET", "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}
