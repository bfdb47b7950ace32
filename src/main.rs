// Parkcast API v0.1
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use parkcast_api::config::AppConfig;
use parkcast_api::errors::ErrorResponse;
use parkcast_api::models::{
    ModelPerformance, Park, ParkMetadata, ParksResponse, PredictionPoint, PredictionRequest,
    PredictionResponse, VisitorStats,
};
use parkcast_api::routes::{self, AppState};
use parkcast_api::services::upstream::UpstreamClient;

/// Parkcast API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Parkcast API",
        version = "0.1.0",
        description = "Visitor-forecasting API gateway for US National Parks. \
            Validates forecast requests, proxies them to the ML prediction \
            service, translates the prediction schema for the dashboard, \
            enriches park metadata with map coordinates, and reports combined \
            service health.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Combined service health"),
        (name = "Parks", description = "Park metadata and statistics"),
        (name = "Predictions", description = "Visitor forecasts"),
    ),
    paths(
        routes::health::health_check,
        routes::parks::list_parks,
        routes::stats::get_park_stats,
        routes::predict::predict_visitors,
        routes::predict::quick_predict,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::health::UpstreamReport,
            routes::predict::PredictBody,
            Park,
            VisitorStats,
            ParkMetadata,
            ParksResponse,
            PredictionRequest,
            PredictionPoint,
            ModelPerformance,
            PredictionResponse,
            ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parkcast_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Create the upstream prediction-service client
    let upstream = UpstreamClient::new(&config.ml_service_url);
    tracing::info!("Proxying predictions to {}", config.ml_service_url);

    // Build shared application state
    let app_state = AppState {
        upstream,
        environment: config.environment.clone(),
    };

    // CORS — the public surface is GET plus the prediction POST
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any);

    // Build router
    let api_routes = Router::new()
        .route("/api/parks", get(routes::parks::list_parks))
        .route(
            "/api/parks/:park_id/stats",
            get(routes::stats::get_park_stats),
        )
        .route("/api/predict", post(routes::predict::predict_visitors))
        .route("/api/predict/:park_id", get(routes::predict::quick_predict))
        .route("/api/health", get(routes::health::health_check))
        .with_state(app_state);

    let app = Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
