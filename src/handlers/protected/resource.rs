use axum::{http::Uri, Extension};

use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Catch-all under /protected. Registered as a protected route so an
/// unauthenticated caller gets 401 before it can learn what exists.
pub async fn resource_not_found(Extension(user): Extension<AuthUser>, uri: Uri) -> ApiError {
    tracing::debug!(subject = %user.subject, path = %uri.path(), "unknown protected resource");
    ApiError::not_found(format!("No protected resource at {}", uri.path()))
}
