use std::time::Duration;

use anyhow::Context;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

#[derive(Debug, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct AccessToken {
    pub access: String,
}

/// Failure talking to the server.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("server rejected the request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Rejected { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

/// Thin JSON client for the Job Tracker API.
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(server: &str) -> anyhow::Result<Self> {
        let base = Url::parse(server).with_context(|| format!("invalid server URL: {}", server))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { base, http })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{} + {}: {}", self.base, path, e)))
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        send(self.http.get(self.url("/health")?)).await
    }

    pub async fn info(&self) -> Result<Value, ClientError> {
        send(self.http.get(self.url("/")?)).await
    }

    pub async fn obtain(&self, subject: &str, secret: &str) -> Result<TokenPair, ClientError> {
        let request = self
            .http
            .post(self.url("/token")?)
            .json(&json!({ "subject": subject, "secret": secret }));
        send(request).await
    }

    pub async fn refresh(&self, refresh: &str) -> Result<AccessToken, ClientError> {
        let request = self
            .http
            .post(self.url("/token/refresh")?)
            .json(&json!({ "refresh": refresh }));
        send(request).await
    }

    pub async fn whoami(&self, access: &str) -> Result<Value, ClientError> {
        send(self.http.get(self.url("/protected/whoami")?).bearer_auth(access)).await
    }
}

async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ClientError> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let message = match response.json::<Value>().await {
        Ok(body) => body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };

    Err(ClientError::Rejected { status, message })
}
