//! Public API data model.
//!
//! These are the JSON shapes served to the browser. They are distinct from
//! the upstream ML-service shapes (`services::upstream`); the translation
//! between the two lives in `services::translate`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::AppError;

/// Confidence-interval width convention for prediction bounds, in percent.
/// Fixed: the upstream service trains 80% intervals and does not report this.
pub const CONFIDENCE_LEVEL: u8 = 80;

/// Allowed range for `days_ahead` in a prediction request.
pub const DAYS_AHEAD_MIN: i64 = 1;
pub const DAYS_AHEAD_MAX: i64 = 365;

/// Daily visitor statistics for a park.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VisitorStats {
    pub min_visitors: i64,
    pub max_visitors: i64,
    pub avg_visitors: f64,
}

/// Aggregate weather/seasonal summary for a park's historical data.
/// All fields optional — the upstream database may not cover every park.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ParkMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_temperature_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_precipitation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_common_weather: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekend_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holiday_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_session_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_seasonal_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_common_visitor_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_data_points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_date: Option<String>,
}

/// A park as served by `GET /api/parks`: upstream metadata merged with the
/// static coordinate table. Built fresh on every listing request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Park {
    /// Short unique park code (e.g. "YELL")
    pub park_id: String,
    /// Display name (e.g. "Yellowstone National Park")
    pub name: String,
    /// Two-letter state code
    pub state: String,
    /// NPS region label
    pub region: String,
    /// Park-type label (e.g. "National Park", "National Monument")
    pub park_type: String,
    /// Whether a trained forecasting model exists for this park
    pub has_model: bool,
    /// Whether historical visitor data is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_available: Option<bool>,
    /// When the park's model was last trained (ISO 8601)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_trained: Option<String>,
    /// Latitude, present only when the park is in the coordinate table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude, present only when the park is in the coordinate table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visitor_stats: Option<VisitorStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ParkMetadata>,
}

/// Response body for `GET /api/parks`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParksResponse {
    pub parks: Vec<Park>,
    pub total: usize,
    /// Generation timestamp (ISO 8601)
    pub timestamp: String,
}

/// A validated forecast request: park code, ISO start date, day count.
/// Serialized as-is to the upstream `POST /predict` body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionRequest {
    pub park_id: String,
    /// Start date in YYYY-MM-DD format
    pub start_date: String,
    pub days_ahead: i64,
}

impl PredictionRequest {
    /// Check the request invariants. Runs before any upstream I/O.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.park_id.trim().is_empty() {
            return Err(AppError::Validation(
                "missing required field: park_id".to_string(),
            ));
        }
        if self.start_date.trim().is_empty() {
            return Err(AppError::Validation(
                "missing required field: start_date".to_string(),
            ));
        }
        if !(DAYS_AHEAD_MIN..=DAYS_AHEAD_MAX).contains(&self.days_ahead) {
            return Err(AppError::Validation(format!(
                "days_ahead must be between {} and {}",
                DAYS_AHEAD_MIN, DAYS_AHEAD_MAX
            )));
        }
        Ok(())
    }
}

/// A single forecast day in the public response shape.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionPoint {
    /// Forecast date in YYYY-MM-DD format
    pub ds: String,
    /// Predicted daily visitors
    pub yhat: i64,
    /// Lower prediction bound
    pub yhat_lower: i64,
    /// Upper prediction bound
    pub yhat_upper: i64,
    /// Forecast high temperature, when upstream supplies it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Weather summary label, when upstream supplies it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    /// Per-day confidence score, when upstream supplies it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Model quality metrics. The upstream service does not yet report these,
/// so every response carries zero placeholders.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ModelPerformance {
    pub mae: f64,
    pub rmse: f64,
    pub mape: f64,
}

/// Response body for the prediction endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    pub park_id: String,
    /// Chronological, one entry per requested day, order as returned upstream
    pub predictions: Vec<PredictionPoint>,
    pub confidence_level: u8,
    pub model_performance: ModelPerformance,
    /// Generation timestamp (ISO 8601)
    pub timestamp: String,
    /// Echo of the request, for client-side caching and debugging
    pub request_params: PredictionRequest,
}
