use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("price predictor unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),
    #[error("price predictor rejected the request with status {status}")]
    Rejected { status: u16, body: Value },
    #[error("price predictor sent an unexpected body: {0}")]
    Malformed(String),
}

#[derive(Deserialize)]
struct PredictionBody {
    prediction: f64,
}

/// HTTP client of the price prediction API.
#[derive(Debug, Clone)]
pub struct PredictorClient {
    client: reqwest::Client,
    predict_url: String,
}

impl PredictorClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            predict_url: format!("{}/predict", base_url.trim_end_matches('/')),
        }
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    /// Forwards a car description as-is; validating it is the service's job.
    pub async fn predict(&self, car: &Value) -> Result<f64, PredictorError> {
        let resp = self.client.post(&self.predict_url).json(car).send().await?;
        let status = resp.status();
        if !status.is_success() {
            // Non-JSON bodies are relayed as a JSON string.
            let text = resp.text().await.unwrap_or_default();
            let body = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text));
            return Err(PredictorError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        let body: PredictionBody = resp
            .json()
            .await
            .map_err(|e| PredictorError::Malformed(e.to_string()))?;
        Ok(body.prediction)
    }
}
