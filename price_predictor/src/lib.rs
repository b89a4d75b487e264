use anyhow::{bail, Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod model;
pub mod preprocess;
pub mod types;

use config::{Args, ModelFormat};
use error::{ApiError, ApiResult};
use model::{LinearRegressor, Regressor};
use preprocess::FeaturePreprocessor;
use types::{CarDescription, HealthOut, PredictionOut};

/// Preprocessor and model, loaded once and shared read-only by every request.
pub struct Predictor {
    pre: FeaturePreprocessor,
    mdl: Box<dyn Regressor>,
}

impl Predictor {
    /// Pairs the two artifacts and runs a warm-up prediction. Fails if the
    /// model expects a different feature width than the preprocessor emits.
    pub fn new(pre: FeaturePreprocessor, mdl: Box<dyn Regressor>) -> Result<Self> {
        if let Some(in_dim) = mdl.input_dim() {
            if in_dim != pre.width() {
                bail!(
                    "model expects {} features but preprocessor produces {}",
                    in_dim,
                    pre.width()
                );
            }
        }
        let p = Self { pre, mdl };
        let warm = p.predict(&CarDescription::probe())?;
        tracing::info!(warmup = warm, "warmup prediction ok");
        Ok(p)
    }

    pub fn feature_count(&self) -> usize {
        self.pre.width()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.pre.feature_names()
    }

    pub fn transform(&self, car: &CarDescription) -> Vec<f32> {
        self.pre.transform(car)
    }

    pub fn predict(&self, car: &CarDescription) -> Result<f64> {
        let x = self.pre.transform(car);
        let y = self.mdl.predict(&x)?;
        if !y.is_finite() {
            bail!("model returned a non-finite prediction ({})", y);
        }
        Ok(f64::from(y))
    }
}

fn load_model(args: &Args, in_dim: usize) -> Result<Box<dyn Regressor>> {
    match args.model_format {
        ModelFormat::Linear => Ok(Box::new(LinearRegressor::load(&args.model_path)?)),
        #[cfg(feature = "torch")]
        ModelFormat::Torchscript => Ok(Box::new(model::TorchRegressor::load(&args.model_path, in_dim)?)),
        #[cfg(not(feature = "torch"))]
        ModelFormat::Torchscript => {
            let _ = in_dim;
            bail!("torchscript models need a build with the `torch` feature")
        }
    }
}

/// Startup path: preprocessor, then model, then the readiness checks.
pub fn load_predictor(args: &Args) -> Result<Predictor> {
    let pre = FeaturePreprocessor::load(&args.preprocessor_path)
        .context("failed to load preprocessor")?;
    let mdl = load_model(args, pre.width()).context("failed to load model")?;
    Predictor::new(pre, mdl).context("model and preprocessor are incompatible")
}

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub log_features: bool,
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "name": "Rental Price Prediction API",
        "description": "Submit the parameters of a car and get a recommended rental price per day.",
        "endpoints": { "predict": "POST /predict", "health": "GET /health" }
    }))
}

async fn health(State(state): State<AppState>) -> Json<HealthOut> {
    Json(HealthOut {
        status: "ready",
        version: env!("CARGO_PKG_VERSION"),
        feature_count: state.predictor.feature_count(),
    })
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<CarDescription>, JsonRejection>,
) -> ApiResult<Json<PredictionOut>> {
    let Json(car) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    car.validate().map_err(ApiError::Validation)?;

    if state.log_features {
        let x = state.predictor.transform(&car);
        let nz = x.iter().filter(|v| **v != 0.0).count();
        tracing::info!(
            "recv model_key={:?} car_type={:?} in_dim={} nonzero={} x={:?}",
            car.model_key,
            car.car_type,
            x.len(),
            nz,
            x
        );
    }

    let prediction = state.predictor.predict(&car).map_err(|e| {
        tracing::error!(error = %e, "prediction failed");
        ApiError::Inference(e.to_string())
    })?;
    tracing::debug!(prediction, "prediction served");

    Ok(Json(PredictionOut { prediction }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/predict", post(predict))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
