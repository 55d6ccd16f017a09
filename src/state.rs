use std::sync::Arc;

use crate::auth::{AuthGateway, Clock};
use crate::config::AppConfig;
use crate::credentials::CredentialStore;

/// Per-process state handed to every handler.
///
/// Built once at startup; everything inside is read-only for the process
/// lifetime, so cloning per request is just reference counting.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gateway: Arc<AuthGateway>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        credentials: Arc<dyn CredentialStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let gateway = AuthGateway::from_config(&config.security, credentials, clock);
        Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
        }
    }
}
