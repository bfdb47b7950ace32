//! Upstream → public prediction translation.
//!
//! Pure field renaming: `date→ds`, `predicted_visitors→yhat`,
//! `lower_bound→yhat_lower`, `upper_bound→yhat_upper`. No numeric
//! transformation. A 2xx upstream reply without an explicit success flag and
//! a non-null predictions list is a semantic failure, reported with the
//! upstream's own message when it supplies one.

use chrono::Utc;

use crate::errors::AppError;
use crate::models::{
    ModelPerformance, PredictionPoint, PredictionRequest, PredictionResponse, CONFIDENCE_LEVEL,
};
use crate::services::upstream::{UpstreamPredictionEnvelope, UpstreamPredictionRecord};

/// Translate one upstream forecast day into the public shape.
pub fn translate_point(record: &UpstreamPredictionRecord) -> PredictionPoint {
    PredictionPoint {
        ds: record.date.clone(),
        yhat: record.predicted_visitors,
        yhat_lower: record.lower_bound,
        yhat_upper: record.upper_bound,
        temperature: record.temperature,
        weather: record.weather.clone(),
        confidence: record.confidence,
    }
}

/// Build the public prediction response from an upstream envelope.
///
/// Confidence level is fixed at 80 and model-performance metrics are zero
/// placeholders — upstream does not yet supply either.
pub fn translate_prediction(
    envelope: UpstreamPredictionEnvelope,
    request: &PredictionRequest,
) -> Result<PredictionResponse, AppError> {
    let records = match envelope.predictions {
        Some(records) if envelope.success => records,
        _ => {
            // Upstream ran but produced no usable result
            let message = envelope
                .error
                .unwrap_or_else(|| "Prediction service returned no result".to_string());
            return Err(AppError::UpstreamClientError {
                status: 400,
                message,
            });
        }
    };

    Ok(PredictionResponse {
        park_id: request.park_id.clone(),
        predictions: records.iter().map(translate_point).collect(),
        confidence_level: CONFIDENCE_LEVEL,
        model_performance: ModelPerformance::default(),
        timestamp: Utc::now().to_rfc3339(),
        request_params: request.clone(),
    })
}
