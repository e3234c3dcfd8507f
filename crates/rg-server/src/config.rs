//! Server configuration.
//!
//! Configuration is loaded from environment variables with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host to bind to.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// Path to the realm-configuration document.
    pub realm_config: PathBuf,

    /// Path to the user-store document.
    pub user_config: PathBuf,

    /// Directory for in-flight login-state records.
    pub state_dir: PathBuf,

    /// Cluster name attached to sessions of audit-capable identities.
    pub cluster_name: Option<String>,

    /// File holding the ticket-signing key material. Without it a fresh
    /// key is generated at startup and tickets do not survive a restart.
    pub ticket_secret_file: Option<PathBuf>,

    /// Seconds after which an abandoned login state expires.
    pub state_max_age_secs: u64,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let host = std::env::var("RG_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("RG_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let realm_config = std::env::var("RG_REALM_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("domains.json"));

        let user_config = std::env::var("RG_USER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("user.json"));

        let state_dir = std::env::var("RG_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("openid-auth-state"));

        let cluster_name = std::env::var("RG_CLUSTER_NAME").ok();

        let ticket_secret_file = std::env::var("RG_TICKET_SECRET_FILE").ok().map(PathBuf::from);

        let state_max_age_secs = std::env::var("RG_STATE_MAX_AGE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(600); // 10 minutes

        Ok(Self {
            host,
            port,
            realm_config,
            user_config,
            state_dir,
            cluster_name,
            ticket_secret_file,
            state_max_age_secs,
        })
    }

    /// Returns how long an abandoned login state is kept.
    #[must_use]
    pub const fn state_max_age(&self) -> Duration {
        Duration::from_secs(self.state_max_age_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            realm_config: PathBuf::from("domains.json"),
            user_config: PathBuf::from("user.json"),
            state_dir: PathBuf::from("openid-auth-state"),
            cluster_name: None,
            ticket_secret_file: None,
            state_max_age_secs: 600,
        }
    }
}
