use axum::Json;
use serde_json::{json, Value};

/// GET / - welcome message and a map of the API surface.
pub async fn home_get() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Job Tracker API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health (public)",
            "token": "/token (public - obtain access/refresh pair)",
            "token_refresh": "/token/refresh (public - exchange refresh for access)",
            "protected": "/protected/* (bearer token)",
        }
    }))
}
