use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use crate::error::{AppError, Result};

/// Input features the service's model was trained on, in form order.
pub const PREDICTION_FEATURES: &[(&str, &str)] = &[
    ("Employees", "Employees"),
    ("Years_in_Operation", "Years in Operation"),
    ("Credit_Score", "Credit Score"),
    ("Revenue_Growth_Rate", "Revenue Growth Rate"),
    ("Asset_Growth_Rate", "Asset Growth Rate"),
    ("Loan_Dependency_Ratio", "Loan Dependency Ratio"),
    ("Industry_Type", "Industry Type (code)"),
    ("Business_Type", "Business Type (code)"),
    ("State", "State (code)"),
    ("District", "District (code)"),
];

/// A feature's contribution to the model, as a percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureShare {
    pub feature: String,
    pub percent: f64,
}

/// Convert fractional importances to percentages, largest first.
pub fn feature_shares(importance: &HashMap<String, f64>) -> Vec<FeatureShare> {
    let mut shares: Vec<FeatureShare> = importance
        .iter()
        .filter(|(_, fraction)| fraction.is_finite())
        .map(|(feature, fraction)| FeatureShare {
            feature: feature.clone(),
            percent: fraction * 100.0,
        })
        .collect();

    shares.sort_by(|a, b| {
        b.percent
            .partial_cmp(&a.percent)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.feature.cmp(&b.feature))
    });
    shares
}

/// Named numeric values sent to `/predict`.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionInput {
    values: Vec<(String, f64)>,
}

impl PredictionInput {
    /// Parse raw form text keyed by feature name. Blank fields count as zero.
    pub fn from_form(fields: &[(String, String)]) -> Result<Self> {
        let mut values = Vec::with_capacity(fields.len());
        let mut invalid = Vec::new();

        for (key, raw) in fields {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                values.push((key.clone(), 0.0));
                continue;
            }
            match trimmed.parse::<f64>() {
                Ok(value) if value.is_finite() => values.push((key.clone(), value)),
                _ => invalid.push(key.clone()),
            }
        }

        if invalid.is_empty() {
            Ok(Self { values })
        } else {
            Err(AppError::validation(format!(
                "Enter a number for: {}",
                invalid.join(", ")
            )))
        }
    }

    pub fn values(&self) -> &[(String, f64)] {
        &self.values
    }

    /// JSON body for the prediction request, in form order.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        for (key, value) in &self.values {
            let number = Number::from_f64(*value).unwrap_or_else(|| Number::from(0));
            body.insert(key.clone(), Value::Number(number));
        }
        Value::Object(body)
    }
}
