//! Park listing endpoint.
//!
//! GET /api/parks — upstream park metadata merged with the static
//! coordinate table.

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::coords;
use crate::errors::{AppError, ErrorResponse};
use crate::models::{Park, ParksResponse};
use crate::routes::AppState;
use crate::services::upstream::UpstreamPark;

/// Attach coordinates from the static table when the park is known.
/// An absent entry leaves the fields unset; the park is listed but not
/// plotted on the map.
fn enrich_with_coordinates(park: UpstreamPark) -> Park {
    let coordinates = coords::lookup(&park.park_id);
    Park {
        park_id: park.park_id,
        name: park.name,
        state: park.state,
        region: park.region,
        park_type: park.park_type,
        has_model: park.has_model,
        data_available: park.data_available,
        last_trained: park.last_trained,
        latitude: coordinates.map(|(lat, _)| lat),
        longitude: coordinates.map(|(_, lon)| lon),
        visitor_stats: park.visitor_stats,
        metadata: park.metadata,
    }
}

/// List all parks with their model status, enriched with map coordinates.
///
/// An empty upstream list is valid output, not an error.
#[utoipa::path(
    get,
    path = "/api/parks",
    tag = "Parks",
    responses(
        (status = 200, description = "Enriched park list", body = ParksResponse),
        (status = 503, description = "Prediction service unreachable or failing", body = ErrorResponse),
        (status = 504, description = "Prediction service timed out", body = ErrorResponse),
    )
)]
pub async fn list_parks(State(state): State<AppState>) -> Result<Json<ParksResponse>, AppError> {
    let upstream_parks = state.upstream.list_parks().await?;
    let parks: Vec<Park> = upstream_parks
        .into_iter()
        .map(enrich_with_coordinates)
        .collect();

    Ok(Json(ParksResponse {
        total: parks.len(),
        parks,
        timestamp: Utc::now().to_rfc3339(),
    }))
}
