//! ML prediction service client.
//!
//! Every HTTP call to the upstream service goes through this module, with a
//! per-call timeout budget and transport/status failure classification.
//! Upstream JSON contracts are explicit structs validated at this boundary.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{ParkMetadata, PredictionRequest, VisitorStats};

/// Timeout for park listing and stats calls.
pub const LISTING_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for health probes. Health checks must fail fast.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for prediction calls. Model inference is the slowest operation.
pub const PREDICTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the upstream prediction/metadata service.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

// --- Upstream JSON response types ---

fn unknown() -> String {
    "Unknown".to_string()
}

/// Park record as returned by upstream `GET /parks`.
///
/// Upstream sometimes attaches its own latitude/longitude; those fields are
/// deliberately not modelled here — coordinates come from the static table.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamPark {
    pub park_id: String,
    pub name: String,
    #[serde(default = "unknown")]
    pub state: String,
    #[serde(default = "unknown")]
    pub region: String,
    #[serde(default = "unknown")]
    pub park_type: String,
    #[serde(default)]
    pub has_model: bool,
    #[serde(default)]
    pub data_available: Option<bool>,
    #[serde(default)]
    pub last_trained: Option<String>,
    #[serde(default)]
    pub visitor_stats: Option<VisitorStats>,
    #[serde(default)]
    pub metadata: Option<ParkMetadata>,
}

/// Upstream `GET /health` body. The original service spells the model count
/// `models_available`; newer builds use `models_loaded` — accept both.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamHealth {
    pub status: String,
    #[serde(default, alias = "models_available")]
    pub models_loaded: i64,
    #[serde(default)]
    pub database_connected: bool,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One forecast day as returned by upstream `POST /predict`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamPredictionRecord {
    pub date: String,
    pub predicted_visitors: i64,
    pub lower_bound: i64,
    pub upper_bound: i64,
    #[serde(default)]
    pub confidence_interval: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Envelope for upstream `POST /predict`.
///
/// Success is an explicit flag: a 2xx reply can still carry a failure
/// (`success: false` plus an `error` message, or a null `predictions` list).
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamPredictionEnvelope {
    pub success: bool,
    #[serde(default)]
    pub park_id: Option<String>,
    #[serde(default)]
    pub prediction_start: Option<String>,
    #[serde(default)]
    pub days_predicted: Option<i64>,
    #[serde(default)]
    pub predictions: Option<Vec<UpstreamPredictionRecord>>,
    #[serde(default)]
    pub model_info: Option<serde_json::Value>,
    #[serde(default)]
    pub park_stats: Option<serde_json::Value>,
    #[serde(default)]
    pub generated_at: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Error body shapes seen from upstream: FastAPI uses `detail`, our own
/// gateway uses `error`.
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Classify a send-level (transport) failure.
pub(crate) fn classify_transport_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        tracing::warn!("Upstream call timed out: {}", err);
        AppError::UpstreamTimeout
    } else {
        tracing::warn!("Upstream unreachable: {}", err);
        AppError::UpstreamUnavailable
    }
}

/// Classify a non-2xx response.
///
/// ≥500 collapses to a generic service error; other statuses forward the
/// upstream's own message (`detail` or `error` field) to the caller.
pub(crate) fn classify_status_error(status: reqwest::StatusCode, body: &str) -> AppError {
    if status.is_server_error() {
        tracing::warn!("Upstream returned {}: {}", status, body);
        return AppError::UpstreamServerError;
    }
    let message = serde_json::from_str::<UpstreamErrorBody>(body)
        .ok()
        .and_then(|b| b.detail.or(b.error))
        .unwrap_or_else(|| format!("Upstream returned HTTP {}", status));
    AppError::UpstreamClientError {
        status: status.as_u16(),
        message,
    }
}

impl UpstreamClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AppError> {
        let response = request.send().await.map_err(classify_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status_error(status, &body));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Unexpected(format!("Malformed upstream response: {}", e)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        timeout: Duration,
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);
        self.execute(self.client.get(&url).timeout(timeout)).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);
        self.execute(self.client.post(&url).json(body).timeout(timeout))
            .await
    }

    /// Fetch the full park list.
    pub async fn list_parks(&self) -> Result<Vec<UpstreamPark>, AppError> {
        self.get_json("/parks", LISTING_TIMEOUT).await
    }

    /// Probe upstream health.
    pub async fn health(&self) -> Result<UpstreamHealth, AppError> {
        self.get_json("/health", HEALTH_TIMEOUT).await
    }

    /// Request a visitor forecast. The request must already be validated.
    pub async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<UpstreamPredictionEnvelope, AppError> {
        self.post_json("/predict", request, PREDICTION_TIMEOUT).await
    }

    /// Fetch per-park statistics, proxied verbatim.
    pub async fn park_stats(&self, park_id: &str) -> Result<serde_json::Value, AppError> {
        self.get_json(&format!("/parks/{}/stats", park_id), LISTING_TIMEOUT)
            .await
    }
}
