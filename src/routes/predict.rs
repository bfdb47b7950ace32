//! Prediction endpoints.
//!
//! - POST /api/predict — forecast request in the body
//! - GET  /api/predict/:park_id — quick variant with query parameters

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::errors::{AppError, ErrorResponse};
use crate::models::{PredictionRequest, PredictionResponse};
use crate::routes::AppState;
use crate::services::translate::translate_prediction;

/// Default forecast window for the quick endpoint, in days.
const DEFAULT_DAYS_AHEAD: i64 = 30;

/// Incoming body for POST /api/predict. Fields are optional so that a
/// missing one produces our own "missing required field" error rather than
/// a deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PredictBody {
    pub park_id: Option<String>,
    /// Start date in YYYY-MM-DD format
    pub start_date: Option<String>,
    pub days_ahead: Option<i64>,
}

impl PredictBody {
    /// Presence check first, then the range/content invariants.
    fn into_request(self) -> Result<PredictionRequest, AppError> {
        let park_id = self
            .park_id
            .ok_or_else(|| AppError::Validation("missing required field: park_id".to_string()))?;
        let start_date = self.start_date.ok_or_else(|| {
            AppError::Validation("missing required field: start_date".to_string())
        })?;
        let days_ahead = self.days_ahead.ok_or_else(|| {
            AppError::Validation("missing required field: days_ahead".to_string())
        })?;

        let request = PredictionRequest {
            park_id,
            start_date,
            days_ahead,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Shared flow for both prediction endpoints: exactly one upstream call,
/// issued only after validation has passed.
async fn run_prediction(
    state: &AppState,
    request: PredictionRequest,
) -> Result<PredictionResponse, AppError> {
    let envelope = state.upstream.predict(&request).await?;
    translate_prediction(envelope, &request)
}

/// Generate a visitor forecast for a park.
#[utoipa::path(
    post,
    path = "/api/predict",
    tag = "Predictions",
    request_body = PredictBody,
    responses(
        (status = 200, description = "Visitor forecast", body = PredictionResponse),
        (status = 400, description = "Invalid request or upstream produced no result", body = ErrorResponse),
        (status = 503, description = "Prediction service unreachable or failing", body = ErrorResponse),
        (status = 504, description = "Prediction service timed out", body = ErrorResponse),
    )
)]
pub async fn predict_visitors(
    State(state): State<AppState>,
    Json(body): Json<PredictBody>,
) -> Result<Json<PredictionResponse>, AppError> {
    let request = body.into_request()?;
    let response = run_prediction(&state, request).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct QuickPredictQuery {
    /// Number of days to predict (default 30)
    pub days_ahead: Option<i64>,
    /// Start date in YYYY-MM-DD format (default: tomorrow, UTC)
    pub start_date: Option<String>,
}

/// Quick prediction with URL parameters instead of a JSON body.
#[utoipa::path(
    get,
    path = "/api/predict/{park_id}",
    tag = "Predictions",
    params(
        ("park_id" = String, Path, description = "Park code, e.g. YELL"),
        QuickPredictQuery,
    ),
    responses(
        (status = 200, description = "Visitor forecast", body = PredictionResponse),
        (status = 400, description = "Invalid request or upstream produced no result", body = ErrorResponse),
        (status = 503, description = "Prediction service unreachable or failing", body = ErrorResponse),
        (status = 504, description = "Prediction service timed out", body = ErrorResponse),
    )
)]
pub async fn quick_predict(
    State(state): State<AppState>,
    Path(park_id): Path<String>,
    Query(params): Query<QuickPredictQuery>,
) -> Result<Json<PredictionResponse>, AppError> {
    let start_date = params.start_date.unwrap_or_else(|| {
        (Utc::now().date_naive() + Duration::days(1))
            .format("%Y-%m-%d")
            .to_string()
    });
    let request = PredictionRequest {
        park_id,
        start_date,
        days_ahead: params.days_ahead.unwrap_or(DEFAULT_DAYS_AHEAD),
    };
    request.validate()?;

    let response = run_prediction(&state, request).await?;
    Ok(Json(response))
}
