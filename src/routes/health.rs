//! Combined health endpoint.
//!
//! GET /api/health — probes upstream with a fast budget and reports an
//! aggregate status. The HTTP status code is the primary machine-readable
//! signal: 200 for "healthy", 503 for "degraded".

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;
use utoipa::ToSchema;

use crate::routes::AppState;

/// Upstream-reported health fields, present only when the probe succeeded.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpstreamReport {
    /// Upstream's own status string
    pub status: String,
    /// Number of trained models currently loaded upstream
    pub models_loaded: i64,
    /// Whether upstream can reach its database
    pub database_connected: bool,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Aggregate status: "healthy" only when upstream explicitly reports it
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream: Option<UpstreamReport>,
    /// Measured round-trip latency of the upstream probe in milliseconds
    pub latency_ms: u64,
    /// API version
    pub version: String,
    /// Runtime environment label
    pub environment: String,
    /// Generation timestamp (ISO 8601)
    pub timestamp: String,
}

/// Combined health check.
///
/// Any upstream status other than "healthy", a non-2xx reply, or a transport
/// failure all map to "degraded" — load balancers key off the 503.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and upstream are healthy", body = HealthResponse),
        (status = 503, description = "Degraded: upstream unhealthy or unreachable", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let probe = state.upstream.health().await;
    let latency_ms = started.elapsed().as_millis() as u64;

    let (healthy, upstream) = match probe {
        Ok(h) => {
            let healthy = h.status == "healthy";
            (
                healthy,
                Some(UpstreamReport {
                    status: h.status,
                    models_loaded: h.models_loaded,
                    database_connected: h.database_connected,
                }),
            )
        }
        Err(e) => {
            tracing::warn!("Upstream health probe failed: {}", e);
            (false, None)
        }
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if healthy { "healthy" } else { "degraded" }.to_string(),
            upstream,
            latency_ms,
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: state.environment.clone(),
            timestamp: Utc::now().to_rfc3339(),
        }),
    )
}
