use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::Claims;
use crate::error::{ApiError, INVALID_TOKEN_MESSAGE, MISSING_CREDENTIALS_MESSAGE};
use crate::state::AppState;

/// Authenticated subject attached to protected requests
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub subject: String,
    pub token_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            issued_at: claims.issued_at(),
            expires_at: claims.expires_at(),
            subject: claims.sub,
            token_id: claims.jti,
        }
    }
}

/// Bearer-token gate for protected routes.
///
/// On failure the request is answered with 401 here and the wrapped handler
/// never runs.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers())?;

    tracing::debug!(subject = %user.subject, path = %request.uri().path(), "bearer accepted");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Method fallback for paths that carry a protected route. Callers must
/// authenticate before they learn which methods the path answers.
pub async fn bearer_method_not_allowed(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiError {
    match authenticate(&state, &headers) {
        Ok(_) => ApiError::method_not_allowed("Method not allowed"),
        Err(e) => e,
    }
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = extract_bearer_token(headers)?;
    let claims = state.gateway.verify(token)?;
    Ok(AuthUser::from(claims))
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized(MISSING_CREDENTIALS_MESSAGE))?;

    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized(INVALID_TOKEN_MESSAGE))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| ApiError::unauthorized(MISSING_CREDENTIALS_MESSAGE))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(ApiError::unauthorized(MISSING_CREDENTIALS_MESSAGE));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::unauthorized(INVALID_TOKEN_MESSAGE));
    }

    Ok(token)
}
