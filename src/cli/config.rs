use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tokens kept between CLI invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub server: String,
    pub subject: String,
    pub access: String,
    pub refresh: String,
    pub obtained_at: DateTime<Utc>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(server: String, subject: String, access: String, refresh: String) -> Self {
        Self {
            server,
            subject,
            access,
            refresh,
            obtained_at: Utc::now(),
            refreshed_at: None,
        }
    }

    pub fn replace_access(&mut self, access: String) {
        self.access = access;
        self.refreshed_at = Some(Utc::now());
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("JOBTRACK_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME")
            .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("jobtrack").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

fn session_file() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join("session.json"))
}

pub fn load_session() -> anyhow::Result<Option<Session>> {
    let path = session_file()?;

    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let session: Session = serde_json::from_str(&content)?;
    Ok(Some(session))
}

pub fn save_session(session: &Session) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(session)?;
    write_private(&session_file()?, content.as_bytes())
}

/// Write a file only the current user can read; it holds live tokens.
#[cfg(unix)]
fn write_private(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten files left by older versions.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(content)?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content)?;
    Ok(())
}

/// Returns whether a session file existed.
pub fn clear_session() -> anyhow::Result<bool> {
    let path = session_file()?;
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path)?;
    Ok(true)
}

/// Explicit flag wins, then the session's server, then the default.
pub fn resolve_server(explicit: Option<String>, session: Option<&Session>) -> String {
    explicit
        .or_else(|| session.map(|s| s.server.clone()))
        .unwrap_or_else(|| super::DEFAULT_SERVER.to_string())
}
