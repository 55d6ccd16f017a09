use axum::Json;
use serde::Serialize;

pub const HEALTH_STATUS: &str = "healthy";
pub const HEALTH_MESSAGE: &str = "Job Tracker API is running!";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// GET /health - fixed liveness payload, always 200.
pub async fn health_get() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTH_STATUS,
        message: HEALTH_MESSAGE,
    })
}
