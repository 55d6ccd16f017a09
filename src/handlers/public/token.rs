// handlers/public/token.rs - token acquisition
//
// POST /token          { "subject", "secret" } -> { "access", "refresh" }
// POST /token/refresh  { "refresh" }           -> { "access" }

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

const REQUIRED_FIELD: &str = "This field is required";

#[derive(Debug, Deserialize)]
pub struct TokenObtainRequest {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub secret: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRefreshRequest {
    #[serde(default)]
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access: String,
}

/// Fail with one field error per blank field.
fn require_fields(fields: &[(&str, &str)]) -> Result<(), ApiError> {
    let missing: HashMap<String, String> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| (name.to_string(), REQUIRED_FIELD.to_string()))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid request body", Some(missing)))
    }
}

/// POST /token - check credentials and issue an access/refresh pair.
pub async fn token_obtain_post(
    State(state): State<AppState>,
    payload: Result<Json<TokenObtainRequest>, JsonRejection>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let Json(request) = payload?;
    require_fields(&[
        ("subject", request.subject.as_str()),
        ("secret", request.secret.as_str()),
    ])?;

    let pair = state.gateway.issue(&request.subject, &request.secret).await?;

    Ok(Json(TokenPairResponse {
        access: pair.access.token,
        refresh: pair.refresh.token,
    }))
}

/// POST /token/refresh - exchange a refresh token for a new access token.
pub async fn token_refresh_post(
    State(state): State<AppState>,
    payload: Result<Json<TokenRefreshRequest>, JsonRejection>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let Json(request) = payload?;
    require_fields(&[("refresh", request.refresh.as_str())])?;

    let access = state.gateway.refresh(request.refresh.trim()).await?;

    Ok(Json(AccessTokenResponse {
        access: access.token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_reported_individually() {
        let err = require_fields(&[("subject", ""), ("secret", "  "), ("other", "x")]).unwrap_err();
        let body = err.to_json();
        assert_eq!(body["field_errors"]["subject"], REQUIRED_FIELD);
        assert_eq!(body["field_errors"]["secret"], REQUIRED_FIELD);
        assert!(body["field_errors"].get("other").is_none());
    }

    #[test]
    fn present_fields_pass() {
        assert!(require_fields(&[("refresh", "token")]).is_ok());
    }
}
