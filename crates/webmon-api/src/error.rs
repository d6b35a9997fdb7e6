use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Failures of the read-only status API.
#[derive(Debug)]
pub enum ApiError {
    /// No probe cycle has been published yet.
    NoCycleYet,
    /// The latest cycle has no result for this site id.
    UnknownSite(String),
    /// The server was built without a monitor attached.
    NoMonitor,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::NoCycleYet => (
                StatusCode::NOT_FOUND,
                "no_cycle",
                "No probe cycle has completed yet".into(),
            ),
            ApiError::UnknownSite(id) => (
                StatusCode::NOT_FOUND,
                "unknown_site",
                format!("Site '{}' not found in latest cycle", id),
            ),
            ApiError::NoMonitor => (
                StatusCode::SERVICE_UNAVAILABLE,
                "no_monitor",
                "No monitor attached to this server".into(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = self.parts();
        (status, axum::Json(ErrorBody { error, message })).into_response()
    }
}
