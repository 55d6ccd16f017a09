use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Router fallback for paths nothing was registered for.
pub async fn not_found(uri: Uri) -> ApiError {
    tracing::debug!(path = %uri.path(), "no route matched");
    ApiError::not_found(format!("No route for {}", uri.path()))
}

/// Give the router's bare 405 the same JSON shape as every other error,
/// keeping the `Allow` header it computed.
pub async fn method_not_allowed_body(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut replaced = ApiError::method_not_allowed("Method not allowed").into_response();
    if let Some(allow) = allow {
        replaced.headers_mut().insert(header::ALLOW, allow);
    }
    replaced
}

/// A 401 carries no `Allow` header, so an unauthenticated caller learns
/// nothing about the methods a guarded path answers.
pub fn hide_allow_on_unauthorized(mut response: Response) -> Response {
    if response.status() == StatusCode::UNAUTHORIZED {
        response.headers_mut().remove(header::ALLOW);
    }
    response
}
