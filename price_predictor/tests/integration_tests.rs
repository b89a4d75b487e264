/// Endpoint tests for the prediction API
///
/// Run with: cargo test -p price_predictor --test integration_tests

use axum::http::StatusCode;
use axum_test::TestServer;
use clap::Parser;
use price_predictor::{
    config::Args,
    load_predictor,
    model::{LinearRegressor, Regressor},
    preprocess::FeaturePreprocessor,
    router, AppState, Predictor,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn artifact(name: &str) -> String {
    format!("{}/artifacts/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn shipped_predictor() -> Predictor {
    let pre = FeaturePreprocessor::load(&artifact("preprocessor.json")).unwrap();
    let mdl = LinearRegressor::load(&artifact("model.json")).unwrap();
    Predictor::new(pre, Box::new(mdl)).unwrap()
}

fn server_with(predictor: Predictor) -> TestServer {
    let state = AppState {
        predictor: Arc::new(predictor),
        log_features: true,
    };
    TestServer::new(router(state)).unwrap()
}

fn renault() -> Value {
    json!({
        "model_key": "Renault",
        "mileage": 50000,
        "engine_power": 100,
        "fuel": "diesel",
        "paint_color": "black",
        "car_type": "sedan",
        "private_parking_available": false,
        "has_gps": false,
        "has_air_conditioning": false,
        "automatic_car": false,
        "has_getaround_connect": false,
        "has_speed_regulator": false,
        "winter_tires": false
    })
}

/// Returns NaN whatever the input.
struct Broken(usize);

impl Regressor for Broken {
    fn input_dim(&self) -> Option<usize> {
        Some(self.0)
    }

    fn predict(&self, _x: &[f32]) -> anyhow::Result<f32> {
        Ok(f32::NAN)
    }
}

#[tokio::test]
async fn test_predict_returns_single_numeric_field() {
    let server = server_with(shipped_predictor());

    let response = server.post("/predict").json(&renault()).await;

    response.assert_status_ok();
    let body: Value = response.json();
    let obj = body.as_object().unwrap();
    assert_eq!(obj.len(), 1);
    let price = obj["prediction"].as_f64().unwrap();
    assert!(price.is_finite());
}

#[tokio::test]
async fn test_predict_is_deterministic() {
    let server = server_with(shipped_predictor());

    let a: Value = server.post("/predict").json(&renault()).await.json();
    let b: Value = server.post("/predict").json(&renault()).await.json();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_unknown_brand_is_client_error() {
    let server = server_with(shipped_predictor());
    let mut body = renault();
    body["model_key"] = json!("Tesla");

    let response = server.post("/predict").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    let err: Value = response.json();
    assert_eq!(err["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_wrong_type_is_client_error() {
    let server = server_with(shipped_predictor());
    let mut body = renault();
    body["has_gps"] = json!("yes");

    let response = server.post("/predict").json(&body).await;

    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_negative_engine_power_is_client_error() {
    let server = server_with(shipped_predictor());
    let mut body = renault();
    body["engine_power"] = json!(-5);

    let response = server.post("/predict").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_missing_field_is_client_error() {
    let server = server_with(shipped_predictor());
    let mut body = renault();
    body.as_object_mut().unwrap().remove("winter_tires");

    let response = server.post("/predict").json(&body).await;

    assert!(response.status_code().is_client_error());
}

#[tokio::test]
async fn test_health_reports_feature_count() {
    let server = server_with(shipped_predictor());

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["feature_count"], 42);
}

#[test]
fn test_nan_model_cannot_become_ready() {
    let pre = FeaturePreprocessor::load(&artifact("preprocessor.json")).unwrap();
    let width = pre.width();
    assert!(Predictor::new(pre, Box::new(Broken(width))).is_err());
}

#[test]
fn test_dimension_mismatch_cannot_become_ready() {
    let pre = FeaturePreprocessor::load(&artifact("preprocessor.json")).unwrap();
    let mdl = LinearRegressor::new(0.0, vec![1.0; 3]);
    let err = Predictor::new(pre, Box::new(mdl)).err().unwrap();
    assert!(err.to_string().contains("features"));
}

/// Finite during warm-up, NaN afterwards.
struct FlakyAfterWarmup {
    width: usize,
    calls: std::sync::atomic::AtomicUsize,
}

impl Regressor for FlakyAfterWarmup {
    fn input_dim(&self) -> Option<usize> {
        Some(self.width)
    }

    fn predict(&self, _x: &[f32]) -> anyhow::Result<f32> {
        let n = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(if n == 0 { 50.0 } else { f32::NAN })
    }
}

#[tokio::test]
async fn test_non_finite_prediction_is_server_error() {
    let pre = FeaturePreprocessor::load(&artifact("preprocessor.json")).unwrap();
    let width = pre.width();
    let mdl = FlakyAfterWarmup {
        width,
        calls: std::sync::atomic::AtomicUsize::new(0),
    };
    let server = server_with(Predictor::new(pre, Box::new(mdl)).unwrap());

    let response = server.post("/predict").json(&renault()).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let err: Value = response.json();
    assert_eq!(err["code"], "INFERENCE_ERROR");
    assert!(err.get("prediction").is_none());
}

// ============ Startup ============

fn startup_args(model_path: &str, preprocessor_path: &str) -> Args {
    Args::try_parse_from([
        "price_predictor",
        "--model-path",
        model_path,
        "--preprocessor-path",
        preprocessor_path,
        "--model-format",
        "linear",
    ])
    .unwrap()
}

#[test]
fn test_shipped_artifacts_start() {
    let args = startup_args(&artifact("model.json"), &artifact("preprocessor.json"));
    let predictor = load_predictor(&args).unwrap();
    assert_eq!(predictor.feature_count(), 42);
}

#[test]
fn test_incompatible_artifacts_explain_themselves() {
    let model = format!("{}/tests/fixtures/model_3.json", env!("CARGO_MANIFEST_DIR"));
    let args = startup_args(&model, &artifact("preprocessor.json"));

    let err = load_predictor(&args).err().unwrap();

    let chain = format!("{:#}", err);
    assert!(chain.starts_with("model and preprocessor are incompatible"), "{}", chain);
    assert!(chain.contains("expects 3 features"), "{}", chain);
}

#[test]
fn test_missing_preprocessor_is_named() {
    let args = startup_args(&artifact("model.json"), "/nonexistent/preprocessor.json");

    let err = load_predictor(&args).err().unwrap();

    assert!(format!("{:#}", err).starts_with("failed to load preprocessor"));
}
