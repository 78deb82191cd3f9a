use std::collections::HashMap;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppError;
use crate::records::GrowthRecord;

use super::FetchResult;

/// Model accuracy reported alongside the processed dataset.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Accuracy {
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "R2")]
    pub r2: f64,
}

/// Body of `GET /get-processed-data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessedData {
    #[serde(default)]
    pub processed_data: Vec<GrowthRecord>,
    #[serde(default)]
    pub accuracy: Option<Accuracy>,
    #[serde(default)]
    pub growth_predictions: Vec<f64>,
}

/// Body of a successful `POST /upload`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `GET /get-feature-importance`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureImportance {
    #[serde(default)]
    pub feature_importance: HashMap<String, f64>,
}

/// Body of `POST /predict`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Prediction {
    pub predicted_growth: f64,
}

/// Decode a service response, turning an `error` field into `AppError::Service`.
///
/// The `error` field wins over the HTTP status so the service's own text
/// reaches the user even on 4xx/5xx replies.
pub fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &str) -> FetchResult<T> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) if status.is_success() => return Err(err.into()),
        Err(_) => {
            return Err(AppError::message(format!(
                "Service returned status {status}"
            )))
        }
    };

    if let Some(message) = service_error(&value) {
        return Err(AppError::Service(message));
    }

    if !status.is_success() {
        return Err(AppError::message(format!(
            "Service returned status {status}"
        )));
    }

    Ok(serde_json::from_value(value)?)
}

fn service_error(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::Bool(false) => None,
        Value::String(s) if s.trim().is_empty() => Some("Service reported an error".to_string()),
        other => Some(value_to_string(other)),
    }
}

pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
