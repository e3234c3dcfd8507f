//! # rg-server
//!
//! RealmGate HTTP server. Wires the file-backed stores, the OpenID
//! provider context and the credential issuer into the access API, runs
//! the login-state purge timer, and serves the router.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;

pub use config::ServerConfig;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rg_api::{AccessState, access_router};
use rg_auth::{
    CredentialIssuer, HmacTicketSigner, LoginOrchestrator, StaticAccessPolicy, TicketSigner,
    UserProvisioner,
};
use rg_openid::{AuthStateStore, ProviderContext};
use rg_storage::{FileRealmStore, FileUserStore, RealmStore, UserStore};
use tokio::net::TcpListener;

/// The RealmGate server.
pub struct Server {
    config: ServerConfig,
    orchestrator: Arc<LoginOrchestrator>,
    states: AuthStateStore,
}

impl Server {
    /// Creates a server instance from its configuration.
    ///
    /// Reads the ticket-signing key material; everything else is opened
    /// lazily per request by the file-backed stores.
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let signer = match &config.ticket_secret_file {
            Some(path) => {
                let secret = tokio::fs::read(path).await?;
                HmacTicketSigner::new(&secret)
            }
            None => {
                tracing::warn!("no ticket secret file configured, tickets will not survive a restart");
                HmacTicketSigner::generate()
            }
        };

        let realms: Arc<dyn RealmStore> = Arc::new(FileRealmStore::new(&config.realm_config));
        let user_store: Arc<dyn UserStore> = Arc::new(FileUserStore::new(&config.user_config));
        let states = AuthStateStore::new(&config.state_dir);

        let mut issuer = CredentialIssuer::new(
            Arc::new(signer) as Arc<dyn TicketSigner>,
            Arc::new(StaticAccessPolicy::default()),
        );
        if let Some(name) = &config.cluster_name {
            issuer = issuer.with_cluster_name(name);
        }

        let orchestrator = Arc::new(LoginOrchestrator::new(
            realms,
            Arc::new(ProviderContext::new()),
            states.clone(),
            UserProvisioner::new(user_store),
            issuer,
        ));

        Ok(Self {
            config,
            orchestrator,
            states,
        })
    }

    /// Runs the server.
    ///
    /// This starts the HTTP server and blocks until it receives a shutdown
    /// signal. The login-state purge timer runs alongside the listener.
    pub async fn run(self) -> anyhow::Result<()> {
        let max_age = self.config.state_max_age();
        let states = self.states.clone();
        let purge = tokio::spawn(async move {
            let mut tick = tokio::time::interval(max_age.min(Duration::from_secs(60)));
            loop {
                tick.tick().await;
                match states.purge_expired(max_age).await {
                    Ok(0) => {}
                    Ok(removed) => tracing::debug!(removed, "purged abandoned login states"),
                    Err(err) => tracing::warn!(error = %err, "login-state purge failed"),
                }
            }
        });

        let app = access_router().with_state(AccessState::new(Arc::clone(&self.orchestrator)));

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("server listening on http://{}", addr);

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        purge.abort();
        tracing::info!("server shutdown complete");
        Ok(())
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Waits for a shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
