use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Longest token lifetime accepted from the environment (one year).
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Largest clock-skew allowance accepted from the environment.
pub const MAX_LEEWAY_SECS: u64 = 5 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: SigningSecret,
    pub jwt_issuer: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
    pub leeway_secs: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CredentialsConfig {
    pub file: PathBuf,
}

/// HMAC key material. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(String);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

impl AppConfig {
    /// Build the configuration from the process environment.
    ///
    /// Fails when `JWT_SECRET` is absent so the server refuses to start
    /// without a signing key.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let secret = lookup("JWT_SECRET")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let preset = match environment {
            Environment::Production => Self::production(SigningSecret::new(secret)),
            Environment::Staging => Self::staging(SigningSecret::new(secret)),
            Environment::Development => Self::development(SigningSecret::new(secret)),
        };

        preset.with_env_overrides(&lookup)
    }

    fn with_env_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("API_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = parse("API_PORT", &v)?;
        }

        // API overrides
        if let Some(v) = lookup("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = parse("API_ENABLE_REQUEST_LOGGING", &v)?;
        }

        // Token overrides
        if let Some(v) = lookup("JWT_ISSUER") {
            self.security.jwt_issuer = v;
        }
        if let Some(v) = lookup("JWT_ACCESS_TTL_SECS") {
            self.security.access_ttl_secs = parse_ttl("JWT_ACCESS_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("JWT_REFRESH_TTL_SECS") {
            self.security.refresh_ttl_secs = parse_ttl("JWT_REFRESH_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("JWT_LEEWAY_SECS") {
            self.security.leeway_secs = parse_at_most("JWT_LEEWAY_SECS", &v, MAX_LEEWAY_SECS)?;
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = parse("SECURITY_ENABLE_CORS", &v)?;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(v) = lookup("CREDENTIALS_FILE") {
            self.credentials.file = PathBuf::from(v);
        }

        Ok(self)
    }

    fn development(jwt_secret: SigningSecret) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            api: ApiConfig {
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_issuer: "job-tracker-api".to_string(),
                access_ttl_secs: 5 * 60,
                refresh_ttl_secs: 24 * 60 * 60,
                leeway_secs: 5,
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            credentials: CredentialsConfig {
                file: PathBuf::from("credentials.yaml"),
            },
        }
    }

    fn staging(jwt_secret: SigningSecret) -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            api: ApiConfig {
                enable_request_logging: true,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_issuer: "job-tracker-api".to_string(),
                access_ttl_secs: 5 * 60,
                refresh_ttl_secs: 24 * 60 * 60,
                leeway_secs: 5,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            credentials: CredentialsConfig {
                file: PathBuf::from("credentials.yaml"),
            },
        }
    }

    fn production(jwt_secret: SigningSecret) -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            api: ApiConfig {
                enable_request_logging: false,
            },
            security: SecurityConfig {
                jwt_secret,
                jwt_issuer: "job-tracker-api".to_string(),
                access_ttl_secs: 5 * 60,
                refresh_ttl_secs: 24 * 60 * 60,
                leeway_secs: 2,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            credentials: CredentialsConfig {
                file: PathBuf::from("/etc/job-tracker/credentials.yaml"),
            },
        }
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn parse_at_most(key: &'static str, value: &str, max: u64) -> Result<u64, ConfigError> {
    match parse::<u64>(key, value)? {
        n if n > max => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
        n => Ok(n),
    }
}

/// Token lifetimes: at least one second, at most [`MAX_TTL_SECS`].
fn parse_ttl(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match parse_at_most(key, value, MAX_TTL_SECS)? {
        0 => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
        ttl => Ok(ttl),
    }
}
