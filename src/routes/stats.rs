//! Per-park statistics endpoint.
//!
//! GET /api/parks/:park_id/stats — proxied verbatim from upstream; an
//! upstream 404 keeps its status and message.

use axum::extract::{Path, State};
use axum::Json;

use crate::errors::{AppError, ErrorResponse};
use crate::routes::AppState;

/// Get historical visitor statistics for one park.
#[utoipa::path(
    get,
    path = "/api/parks/{park_id}/stats",
    tag = "Parks",
    params(
        ("park_id" = String, Path, description = "Park code, e.g. YELL"),
    ),
    responses(
        (status = 200, description = "Park statistics object, upstream shape"),
        (status = 404, description = "Park not known upstream", body = ErrorResponse),
        (status = 503, description = "Prediction service unreachable or failing", body = ErrorResponse),
        (status = 504, description = "Prediction service timed out", body = ErrorResponse),
    )
)]
pub async fn get_park_stats(
    State(state): State<AppState>,
    Path(park_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let stats = state.upstream.park_stats(&park_id).await?;
    Ok(Json(stats))
}
