#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{extract::Request, ServiceExt};
use reqwest::StatusCode;
use serde_json::Value;

use job_tracker_api::auth::SystemClock;
use job_tracker_api::config::AppConfig;
use job_tracker_api::credentials::{hash_secret_with_cost, CredentialStore, StaticCredentialStore};
use job_tracker_api::{app, AppState};

pub const SUBJECT: &str = "u1";
pub const SECRET: &str = "s1";

// Lowest bcrypt cost; production hashes use the default.
const HASH_COST: u32 = 4;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(credentials: Arc<dyn CredentialStore>) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = AppConfig::from_lookup(|key| match key {
            "JWT_SECRET" => Some("integration-test-secret".to_string()),
            "API_HOST" => Some("127.0.0.1".to_string()),
            "API_PORT" => Some(port.to_string()),
            _ => None,
        })?;
        let bind_addr = config.server.bind_address();
        let state = AppState::new(config, credentials, Arc::new(SystemClock));

        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", bind_addr))?;
        let service = app(state.clone());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, ServiceExt::<Request>::into_make_service(service)).await;
        });

        Ok(Self {
            port,
            base_url,
            state,
            handle,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start a server whose credential store accepts exactly (u1, s1).
pub async fn ensure_server() -> Result<TestServer> {
    let hash = hash_secret_with_cost(SECRET, HASH_COST)?;
    let store = StaticCredentialStore::new().with_hash(SUBJECT, hash);
    ensure_server_with(Arc::new(store)).await
}

pub async fn ensure_server_with(credentials: Arc<dyn CredentialStore>) -> Result<TestServer> {
    let server = TestServer::spawn(credentials).await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// POST /token for the default subject and return (access, refresh).
pub async fn login(server: &TestServer) -> Result<(String, String)> {
    let body: Value = reqwest::Client::new()
        .post(server.url("/token"))
        .json(&serde_json::json!({ "subject": SUBJECT, "secret": SECRET }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let access = body["access"].as_str().context("missing access")?.to_string();
    let refresh = body["refresh"].as_str().context("missing refresh")?.to_string();
    Ok((access, refresh))
}
