use crate::domain::model::{FareEstimate, FareQuery, Trip};
use crate::domain::ports::{ConfigProvider, FarePredictor};
use crate::utils::error::{error_chain, Result, TaxifareError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_PREDICTION_ENDPOINT: &str = "https://taxifare.lewagon.ai/predict";

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(default)]
    fare: Option<f64>,
}

// FastAPI reports request problems as `{"detail": ...}`.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: serde_json::Value,
}

fn status_message(status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    let detail = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            detail: serde_json::Value::String(text),
        }) => text,
        Ok(ErrorResponse { detail }) => detail.to_string(),
        Err(_) => body.to_string(),
    };

    if detail.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, detail)
    }
}

pub struct HttpFarePredictor {
    client: Client,
    endpoint: String,
}

impl HttpFarePredictor {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::new(config.prediction_endpoint(), config.request_timeout())
    }
}

#[async_trait]
impl FarePredictor for HttpFarePredictor {
    async fn predict(&self, trip: &Trip) -> Result<FareEstimate> {
        let query = FareQuery::from(trip);
        tracing::debug!("Requesting fare prediction: {:?}", query);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to send prediction request. URL: {}\nError: {}",
                    self.endpoint,
                    e
                );
                TaxifareError::PredictionRequestError {
                    status: e.status().map(|s| s.as_u16()),
                    message: error_chain(&e),
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TaxifareError::PredictionRequestError {
                status: Some(status.as_u16()),
                message: error_chain(&e),
            })?;

        if !status.is_success() {
            tracing::error!(
                "Prediction API returned non-success status: {}. Body: {}",
                status,
                text
            );
            return Err(TaxifareError::PredictionRequestError {
                status: Some(status.as_u16()),
                message: status_message(status, &text),
            });
        }

        let body: PredictionResponse = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                "Failed to parse prediction response. Error: {}. Body: {}",
                e,
                text
            );
            TaxifareError::MalformedPrediction {
                message: e.to_string(),
            }
        })?;

        let fare = body.fare.ok_or(TaxifareError::MissingFare)?;
        tracing::debug!("Predicted fare: {}", fare);
        Ok(FareEstimate { fare })
    }
}
