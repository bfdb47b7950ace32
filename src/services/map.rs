//! Map prediction aggregation controller.
//!
//! App-runtime driver for the dashboard map: for one selected calendar date,
//! it fans out a prediction request per modelled park against the public API
//! and assembles a keyed per-park result set. The upstream prediction call is
//! windowed from the anchor date rather than addressable by a single day, so
//! every request spans anchor→selected-date and the response is filtered down
//! to the one matching entry.
//!
//! State is owned here and shared as `Arc<RwLock<MapState>>`; every update is
//! a wholesale replacement, never a field-by-field patch. Aggregation runs
//! are tagged with a launch sequence number and a superseded run discards its
//! results instead of applying them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use futures::future::join_all;
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::{
    ModelPerformance, Park, ParksResponse, PredictionRequest, PredictionResponse,
    CONFIDENCE_LEVEL,
};
use crate::services::upstream::{
    classify_status_error, classify_transport_error, LISTING_TIMEOUT, PREDICTION_TIMEOUT,
};

/// Client for the public API, used from the app runtime.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET {base}/parks`.
    pub async fn fetch_parks(&self) -> Result<ParksResponse, AppError> {
        let url = format!("{}/parks", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(LISTING_TIMEOUT)
            .send()
            .await
            .map_err(classify_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status_error(status, &body));
        }
        response
            .json()
            .await
            .map_err(|e| AppError::Unexpected(format!("Malformed parks response: {}", e)))
    }

    /// `POST {base}/predict`.
    pub async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, AppError> {
        let url = format!("{}/predict", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .timeout(PREDICTION_TIMEOUT)
            .send()
            .await
            .map_err(classify_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status_error(status, &body));
        }
        response
            .json()
            .await
            .map_err(|e| AppError::Unexpected(format!("Malformed prediction response: {}", e)))
    }
}

/// Session-held map state. The prediction set covers exactly one selected
/// date; parks whose call failed or had no entry for that date are present
/// with an empty prediction list ("no data", not omitted).
#[derive(Debug, Clone)]
pub struct MapState {
    pub parks: Vec<Park>,
    pub selected_date: NaiveDate,
    pub predictions: HashMap<String, PredictionResponse>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl MapState {
    pub fn new(selected_date: NaiveDate) -> Self {
        Self {
            parks: Vec::new(),
            selected_date,
            predictions: HashMap::new(),
            last_updated: None,
        }
    }
}

/// Shared map state handle.
pub type SharedMapState = Arc<RwLock<MapState>>;

/// Window length for a map request: anchor-to-date offset in whole days plus
/// one, never fewer than one.
pub fn days_ahead_for(anchor: NaiveDate, selected: NaiveDate) -> i64 {
    ((selected - anchor).num_days() + 1).max(1)
}

/// Fan-out driver that owns the map state.
pub struct MapPredictionController {
    api: ApiClient,
    anchor_date: NaiveDate,
    state: SharedMapState,
    /// Sequence number of the most recently launched aggregation run.
    issued_runs: AtomicU64,
}

impl MapPredictionController {
    pub fn new(api_base_url: &str, anchor_date: NaiveDate) -> Self {
        Self {
            api: ApiClient::new(api_base_url),
            anchor_date,
            state: Arc::new(RwLock::new(MapState::new(anchor_date))),
            issued_runs: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> SharedMapState {
        self.state.clone()
    }

    /// (Re)load the park list from the public API, then rebuild the
    /// prediction set for the currently selected date.
    ///
    /// A listing failure is an orchestration-level error and surfaces to the
    /// caller, unlike per-park prediction failures.
    pub async fn load_parks(&self) -> Result<bool, AppError> {
        let response = self.api.fetch_parks().await?;
        let date = {
            let mut st = self.state.write().await;
            st.parks = response.parks;
            st.selected_date
        };
        Ok(self.run_aggregation(date).await)
    }

    /// Select a new date and rebuild the prediction set for it.
    ///
    /// Returns whether this run's results were applied; `false` means a
    /// newer run was launched in the meantime and this one was discarded.
    pub async fn select_date(&self, date: NaiveDate) -> bool {
        self.run_aggregation(date).await
    }

    async fn run_aggregation(&self, date: NaiveDate) -> bool {
        let run_id = self.issued_runs.fetch_add(1, Ordering::SeqCst) + 1;

        let modelled: Vec<String> = {
            let st = self.state.read().await;
            st.parks
                .iter()
                .filter(|p| p.has_model)
                .map(|p| p.park_id.clone())
                .collect()
        };

        let start_date = self.anchor_date.format("%Y-%m-%d").to_string();
        let days_ahead = days_ahead_for(self.anchor_date, date);
        let target = date.format("%Y-%m-%d").to_string();

        // One call per modelled park, all in flight together. Each call
        // settles to either a response or a "no data" entry; an individual
        // failure never aborts the batch.
        let calls = modelled.into_iter().map(|park_id| {
            let api = self.api.clone();
            let request = PredictionRequest {
                park_id: park_id.clone(),
                start_date: start_date.clone(),
                days_ahead,
            };
            async move {
                let result = api.predict(&request).await;
                (park_id, request, result)
            }
        });
        let settled = join_all(calls).await;

        let mut predictions = HashMap::with_capacity(settled.len());
        for (park_id, request, result) in settled {
            let response = match result {
                Ok(mut response) => {
                    // Keep only the entry for the selected date; none is a
                    // valid "no data for this date" state.
                    response.predictions.retain(|p| p.ds == target);
                    response
                }
                Err(e) => {
                    tracing::warn!("No map prediction for {}: {}", park_id, e);
                    no_data_response(request)
                }
            };
            predictions.insert(park_id, response);
        }

        let mut st = self.state.write().await;
        if self.issued_runs.load(Ordering::SeqCst) != run_id {
            tracing::debug!("Aggregation run {} superseded, discarding results", run_id);
            return false;
        }
        st.selected_date = date;
        st.predictions = predictions;
        st.last_updated = Some(Utc::now());
        true
    }
}

/// Entry recorded for a park whose call failed: an empty prediction list,
/// which the map renders as "no data" on the marker.
fn no_data_response(request: PredictionRequest) -> PredictionResponse {
    PredictionResponse {
        park_id: request.park_id.clone(),
        predictions: Vec::new(),
        confidence_level: CONFIDENCE_LEVEL,
        model_performance: ModelPerformance::default(),
        timestamp: Utc::now().to_rfc3339(),
        request_params: request,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn park_json(park_id: &str, has_model: bool) -> serde_json::Value {
        json!({
            "park_id": park_id,
            "name": format!("{} (test)", park_id),
            "state": "WY",
            "region": "Intermountain",
            "park_type": "National Park",
            "has_model": has_model
        })
    }

    fn prediction_json(park_id: &str, days: &[(&str, i64)]) -> serde_json::Value {
        let points: Vec<serde_json::Value> = days
            .iter()
            .map(|(ds, yhat)| {
                json!({
                    "ds": ds,
                    "yhat": yhat,
                    "yhat_lower": yhat - 300,
                    "yhat_upper": yhat + 300
                })
            })
            .collect();
        json!({
            "park_id": park_id,
            "predictions": points,
            "confidence_level": 80,
            "model_performance": {"mae": 0.0, "rmse": 0.0, "mape": 0.0},
            "timestamp": "2025-07-04T12:00:00Z",
            "request_params": {"park_id": park_id, "start_date": "2025-07-04", "days_ahead": 2}
        })
    }

    #[test]
    fn test_days_ahead_offset_plus_one() {
        let anchor = date("2025-07-04");
        assert_eq!(days_ahead_for(anchor, date("2025-07-04")), 1);
        assert_eq!(days_ahead_for(anchor, date("2025-07-05")), 2);
        assert_eq!(days_ahead_for(anchor, date("2025-07-13")), 10);
    }

    #[test]
    fn test_days_ahead_never_below_one() {
        let anchor = date("2025-07-04");
        assert_eq!(days_ahead_for(anchor, date("2025-07-01")), 1);
    }

    #[tokio::test]
    async fn test_aggregation_builds_per_park_set_for_selected_date() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/parks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "parks": [
                    park_json("YELL", true),
                    park_json("GRCA", true),
                    park_json("STLI", false)
                ],
                "total": 3,
                "timestamp": "2025-07-04T12:00:00Z"
            })))
            .mount(&server)
            .await;

        // YELL answers with a two-day window; GRCA fails with a server error.
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_partial_json(json!({"park_id": "YELL"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(prediction_json(
                "YELL",
                &[("2025-07-04", 900), ("2025-07-05", 1200)],
            )))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_partial_json(json!({"park_id": "GRCA"})))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .mount(&server)
            .await;

        let controller = MapPredictionController::new(&server.uri(), date("2025-07-04"));
        controller.load_parks().await.unwrap();
        let applied = controller.select_date(date("2025-07-05")).await;
        assert!(applied);

        // Every per-park request is windowed from the anchor date
        let requests = server.received_requests().await.unwrap();
        let predict_bodies: Vec<serde_json::Value> = requests
            .iter()
            .filter(|r| r.url.path() == "/predict")
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect();
        assert!(!predict_bodies.is_empty());
        for body in &predict_bodies {
            assert_eq!(body["start_date"], "2025-07-04");
            assert!(body["days_ahead"].as_i64().unwrap() >= 1);
        }
        // The run for 2025-07-05 must request a window of at least two days
        assert!(predict_bodies
            .iter()
            .any(|b| b["days_ahead"].as_i64().unwrap() >= 2));

        let state = controller.state();
        let st = state.read().await;
        assert_eq!(st.selected_date, date("2025-07-05"));

        // YELL: exactly the one entry matching the selected date
        let yell = &st.predictions["YELL"];
        assert_eq!(yell.predictions.len(), 1);
        assert_eq!(yell.predictions[0].ds, "2025-07-05");
        assert_eq!(yell.predictions[0].yhat, 1200);

        // GRCA: failed call recorded as "no data", not omitted
        let grca = &st.predictions["GRCA"];
        assert!(grca.predictions.is_empty());

        // STLI has no model and is never requested
        assert!(!st.predictions.contains_key("STLI"));
        assert!(!predict_bodies.iter().any(|b| b["park_id"] == "STLI"));
    }

    #[tokio::test]
    async fn test_no_matching_date_yields_empty_prediction_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/parks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "parks": [park_json("ZION", true)],
                "total": 1,
                "timestamp": "2025-07-04T12:00:00Z"
            })))
            .mount(&server)
            .await;
        // Upstream window stops a day short of the selected date
        Mock::given(method("POST"))
            .and(path("/predict"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(prediction_json("ZION", &[("2025-07-04", 800)])),
            )
            .mount(&server)
            .await;

        let controller = MapPredictionController::new(&server.uri(), date("2025-07-04"));
        controller.load_parks().await.unwrap();
        controller.select_date(date("2025-07-05")).await;

        let state = controller.state();
        let st = state.read().await;
        let zion = &st.predictions["ZION"];
        assert!(zion.predictions.is_empty());
    }

    #[tokio::test]
    async fn test_superseded_run_discards_its_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/parks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "parks": [park_json("YELL", true)],
                "total": 1,
                "timestamp": "2025-07-04T12:00:00Z"
            })))
            .mount(&server)
            .await;
        // Run A (window of 6 days) is slow; run B (window of 2) is instant.
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_partial_json(json!({"days_ahead": 6})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(prediction_json("YELL", &[("2025-07-09", 700)]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_partial_json(json!({"days_ahead": 2})))
            .respond_with(ResponseTemplate::new(200).set_body_json(prediction_json(
                "YELL",
                &[("2025-07-04", 900), ("2025-07-05", 1200)],
            )))
            .mount(&server)
            .await;

        let controller = Arc::new(MapPredictionController::new(
            &server.uri(),
            date("2025-07-04"),
        ));
        controller.load_parks().await.unwrap();

        let slow = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.select_date(date("2025-07-09")).await })
        };
        // Let run A launch first, then supersede it
        tokio::time::sleep(Duration::from_millis(50)).await;
        let applied_fast = controller.select_date(date("2025-07-05")).await;
        let applied_slow = slow.await.unwrap();

        assert!(applied_fast);
        assert!(!applied_slow, "stale run must not overwrite newer results");

        let state = controller.state();
        let st = state.read().await;
        assert_eq!(st.selected_date, date("2025-07-05"));
        assert_eq!(st.predictions["YELL"].predictions[0].ds, "2025-07-05");
    }
}
