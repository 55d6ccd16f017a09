use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::claims::{Claims, TokenKind};
use crate::auth::clock::Clock;
use crate::config::SecurityConfig;
use crate::credentials::{CredentialStore, CredentialStoreError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("token has expired")]
    ExpiredToken,

    #[error(transparent)]
    Upstream(#[from] CredentialStoreError),

    #[error("token generation failed: {0}")]
    TokenGeneration(String),
}

/// Lifetimes and issuer applied to minted tokens.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub issuer: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Seconds of clock skew tolerated past `exp`.
    pub leeway_secs: i64,
}

impl TokenSettings {
    pub fn from_config(security: &SecurityConfig) -> Self {
        Self {
            issuer: security.jwt_issuer.clone(),
            access_ttl: seconds(security.access_ttl_secs),
            refresh_ttl: seconds(security.refresh_ttl_secs),
            leeway_secs: i64::try_from(security.leeway_secs).unwrap_or(i64::MAX),
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }
}

/// Saturates instead of panicking; `mint` rejects lifetimes that overflow.
fn seconds(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

/// A signed token together with the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Issues, verifies and refreshes HS256 bearer tokens.
///
/// Stateless: every check is recomputed from the token itself, so the
/// gateway can be shared across requests behind an `Arc` without locking.
pub struct AuthGateway {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    settings: TokenSettings,
    credentials: Arc<dyn CredentialStore>,
    clock: Arc<dyn Clock>,
}

impl AuthGateway {
    pub fn new(
        secret: &[u8],
        settings: TokenSettings,
        credentials: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            settings,
            credentials,
            clock,
        }
    }

    pub fn from_config(
        security: &SecurityConfig,
        credentials: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            security.jwt_secret.as_bytes(),
            TokenSettings::from_config(security),
            credentials,
            clock,
        )
    }

    /// Check credentials and mint an access/refresh pair.
    pub async fn issue(&self, subject: &str, secret: &str) -> Result<TokenPair, AuthError> {
        let accepted = self.credentials.verify(subject, secret).await.map_err(|e| {
            tracing::error!(error = %e, "credential store lookup failed");
            AuthError::Upstream(e)
        })?;

        if !accepted {
            tracing::warn!(subject, "credential check rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let pair = TokenPair {
            access: self.mint(subject, TokenKind::Access)?,
            refresh: self.mint(subject, TokenKind::Refresh)?,
        };
        tracing::info!(subject, "issued token pair");
        Ok(pair)
    }

    /// Exchange a refresh token for a fresh access token for the same subject.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, AuthError> {
        let claims = self
            .decode(refresh_token, TokenKind::Refresh)
            .map_err(|_| AuthError::InvalidToken)?;

        let access = self.mint(&claims.sub, TokenKind::Access)?;
        tracing::info!(subject = %claims.sub, refresh_id = %claims.jti, "refreshed access token");
        Ok(access)
    }

    /// Validate an access token and return its claims.
    pub fn verify(&self, access_token: &str) -> Result<Claims, AuthError> {
        self.decode(access_token, TokenKind::Access)
    }

    fn mint(&self, subject: &str, kind: TokenKind) -> Result<IssuedToken, AuthError> {
        let now = self.clock.now();
        let expires = now.checked_add_signed(self.settings.ttl(kind)).ok_or_else(|| {
            AuthError::TokenGeneration(format!("{} token lifetime out of range", kind))
        })?;
        let claims = Claims {
            sub: subject.to_string(),
            iss: self.settings.issuer.clone(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: kind,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Signature first, then expiry against our own clock, then kind.
    fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the injected clock.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub", "iss"]);
        validation.set_issuer(&[self.settings.issuer.as_str()]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                AuthError::InvalidToken
            })?
            .claims;

        if self.clock.now().timestamp() >= claims.exp.saturating_add(self.settings.leeway_secs) {
            tracing::debug!(subject = %claims.sub, kind = %claims.token_type, "token expired");
            return Err(AuthError::ExpiredToken);
        }

        if claims.token_type != expected {
            tracing::debug!(
                subject = %claims.sub,
                expected = %expected,
                actual = %claims.token_type,
                "token kind mismatch"
            );
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use crate::credentials::test_store;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    const SECRET: &[u8] = b"test-signing-key";

    fn settings() -> TokenSettings {
        TokenSettings {
            issuer: "job-tracker-api".to_string(),
            access_ttl: Duration::minutes(5),
            refresh_ttl: Duration::days(1),
            leeway_secs: 5,
        }
    }

    fn gateway_with(secret: &[u8], clock: Arc<ManualClock>) -> AuthGateway {
        AuthGateway::new(secret, settings(), Arc::new(test_store()), clock)
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()))
    }

    #[tokio::test]
    async fn issued_pair_is_immediately_usable() {
        let gateway = gateway_with(SECRET, clock());
        let pair = gateway.issue("u1", "s1").await.unwrap();

        let claims = gateway.verify(&pair.access.token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.token_type, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 300);
        assert_eq!(pair.refresh.claims.exp - pair.refresh.claims.iat, 86_400);

        assert!(gateway.refresh(&pair.refresh.token).await.is_ok());
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected() {
        let gateway = gateway_with(SECRET, clock());
        assert!(matches!(
            gateway.issue("u1", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            gateway.issue("nobody", "s1").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn expired_access_token_is_rejected_as_expired() {
        let clock = clock();
        let gateway = gateway_with(SECRET, clock.clone());
        let pair = gateway.issue("u1", "s1").await.unwrap();

        // Inside the leeway window the token still passes.
        clock.advance(Duration::minutes(5) + Duration::seconds(2));
        assert!(gateway.verify(&pair.access.token).is_ok());

        clock.advance(Duration::seconds(10));
        assert!(matches!(
            gateway.verify(&pair.access.token),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[tokio::test]
    async fn expired_refresh_token_cannot_refresh() {
        let clock = clock();
        let gateway = gateway_with(SECRET, clock.clone());
        let pair = gateway.issue("u1", "s1").await.unwrap();

        clock.advance(Duration::days(2));
        assert!(matches!(
            gateway.refresh(&pair.refresh.token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn token_from_another_key_is_invalid() {
        let clock = clock();
        let ours = gateway_with(SECRET, clock.clone());
        let theirs = gateway_with(b"some-other-key", clock);

        let foreign = theirs.issue("u1", "s1").await.unwrap();
        assert!(matches!(ours.verify(&foreign.access.token), Err(AuthError::InvalidToken)));
        assert!(matches!(
            ours.refresh(&foreign.refresh.token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn kinds_are_not_interchangeable() {
        let gateway = gateway_with(SECRET, clock());
        let pair = gateway.issue("u1", "s1").await.unwrap();

        assert!(matches!(
            gateway.refresh(&pair.access.token).await,
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            gateway.verify(&pair.refresh.token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn garbage_and_tampered_tokens_are_invalid() {
        let gateway = gateway_with(SECRET, clock());
        assert!(matches!(gateway.verify("not-a-jwt"), Err(AuthError::InvalidToken)));

        let pair = gateway.issue("u1", "s1").await.unwrap();
        let mut tampered = pair.access.token.clone();
        tampered.push('x');
        assert!(matches!(gateway.verify(&tampered), Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn foreign_issuer_is_invalid() {
        let clock = clock();
        let ours = gateway_with(SECRET, clock.clone());
        let mut other_settings = settings();
        other_settings.issuer = "someone-else".to_string();
        let theirs = AuthGateway::new(
            SECRET,
            other_settings,
            Arc::new(test_store()),
            clock,
        );

        let pair = theirs.issue("u1", "s1").await.unwrap();
        assert!(matches!(ours.verify(&pair.access.token), Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn refresh_keeps_subject_and_moves_issued_at() {
        let clock = clock();
        let gateway = gateway_with(SECRET, clock.clone());
        let pair = gateway.issue("u1", "s1").await.unwrap();

        clock.advance(Duration::minutes(3));
        let renewed = gateway.refresh(&pair.refresh.token).await.unwrap();

        assert_eq!(renewed.claims.sub, "u1");
        assert_eq!(renewed.claims.token_type, TokenKind::Access);
        assert!(renewed.claims.iat > pair.access.claims.iat);
        assert_ne!(renewed.claims.jti, pair.access.claims.jti);
        assert_eq!(gateway.verify(&renewed.token).unwrap().sub, "u1");
    }

    #[tokio::test]
    async fn lifetime_past_calendar_range_fails_instead_of_panicking() {
        let mut huge = settings();
        huge.access_ttl = seconds(9_000_000_000_000_000);
        let gateway = AuthGateway::new(SECRET, huge, Arc::new(test_store()), clock());

        assert!(matches!(
            gateway.issue("u1", "s1").await,
            Err(AuthError::TokenGeneration(_))
        ));
    }

    #[test]
    fn config_conversion_saturates() {
        assert_eq!(seconds(300), Duration::seconds(300));
        assert_eq!(seconds(u64::MAX), Duration::MAX);
    }

    struct DownStore;

    #[async_trait]
    impl CredentialStore for DownStore {
        async fn verify(&self, _: &str, _: &str) -> Result<bool, CredentialStoreError> {
            Err(CredentialStoreError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn store_outage_is_reported_as_upstream() {
        let gateway = AuthGateway::new(SECRET, settings(), Arc::new(DownStore), clock());
        assert!(matches!(
            gateway.issue("u1", "s1").await,
            Err(AuthError::Upstream(CredentialStoreError::Unavailable(_)))
        ));
    }
}
