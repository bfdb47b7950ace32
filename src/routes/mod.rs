pub mod health;
pub mod parks;
pub mod predict;
pub mod stats;

use crate::services::upstream::UpstreamClient;

/// Shared application state for the API endpoints.
///
/// Each request handles its own data; nothing here is mutable.
#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    /// Runtime environment label, reported by the health endpoint.
    pub environment: String,
}
