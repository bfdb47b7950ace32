use chrono::NaiveDate;

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the external ML prediction service.
    pub ml_service_url: String,
    /// Public API base URL, used by client-side code (map controller).
    pub api_base_url: String,
    pub port: u16,
    /// Runtime environment label reported by the health endpoint.
    pub environment: String,
    /// Anchor date for map-view day-offset arithmetic.
    pub map_anchor_date: NaiveDate,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .expect("PORT must be a valid u16");

        Self {
            ml_service_url: std::env::var("ML_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            api_base_url: std::env::var("API_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}/api", port)),
            port,
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            map_anchor_date: std::env::var("MAP_ANCHOR_DATE")
                .unwrap_or_else(|_| "2025-07-04".to_string())
                .parse()
                .expect("MAP_ANCHOR_DATE must be a YYYY-MM-DD date"),
        }
    }
}
