use axum::{Extension, Json};

use crate::middleware::AuthUser;

/// GET /protected/whoami - the subject and token window of the caller.
///
/// ```json
/// {
///   "subject": "u1",
///   "token_id": "7c1e...",
///   "issued_at": "2026-01-01T12:00:00Z",
///   "expires_at": "2026-01-01T12:05:00Z"
/// }
/// ```
pub async fn whoami_get(Extension(user): Extension<AuthUser>) -> Json<AuthUser> {
    Json(user)
}
