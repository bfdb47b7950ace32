use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    Validation(String),

    #[error("Prediction service is unavailable")]
    UpstreamUnavailable,

    #[error("Prediction service timed out")]
    UpstreamTimeout,

    #[error("Prediction service error")]
    UpstreamServerError,

    #[error("Upstream error ({status}): {message}")]
    UpstreamClientError { status: u16, message: String },

    #[error("Internal error: {0}")]
    Unexpected(String),
}

impl AppError {
    /// HTTP status this error maps to.
    ///
    /// `UpstreamClientError` echoes the upstream's own status; an invalid
    /// code falls back to 400 (semantic failures are constructed with 400).
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::UpstreamServerError => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UpstreamClientError { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Validation(msg) => msg.clone(),
            // Upstream internals are logged at the call site, never forwarded.
            AppError::UpstreamUnavailable => "Prediction service is unavailable".to_string(),
            AppError::UpstreamTimeout => "Prediction service timed out".to_string(),
            AppError::UpstreamServerError => "Prediction service error".to_string(),
            // Upstream's own message is caller-relevant (bad park id, etc.)
            AppError::UpstreamClientError { message, .. } => message.clone(),
            AppError::Unexpected(msg) => {
                tracing::error!("Unexpected error: {}", msg);
                "Internal server error".to_string()
            }
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let err = AppError::Validation("days_ahead must be between 1 and 365".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unavailable_maps_to_503() {
        assert_eq!(
            AppError::UpstreamUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_timeout_maps_to_504() {
        assert_eq!(
            AppError::UpstreamTimeout.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_server_error_maps_to_503() {
        assert_eq!(
            AppError::UpstreamServerError.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_client_error_echoes_upstream_status() {
        let err = AppError::UpstreamClientError {
            status: 404,
            message: "Park XYZ not found".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_client_error_invalid_status_falls_back_to_400() {
        let err = AppError::UpstreamClientError {
            status: 42,
            message: "nonsense".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unexpected_maps_to_500() {
        let err = AppError::Unexpected("boom".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
