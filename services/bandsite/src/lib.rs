//! Bandsite - promotional website and content dashboard for a music group
//!
//! Serves the public pages (home, music, shows, media, press kit, booking
//! form) and an editor dashboard, with all content kept in a hosted table
//! store and editors authenticated against its auth endpoint.

pub mod auth;
pub mod config;
pub mod contact;
pub mod content;
pub mod error;
pub mod io;
pub mod query;
pub mod selection;
pub mod store;
pub mod web;

pub use config::{load_config, Config};
pub use error::{Result, SiteError};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::auth::{AuthClient, AuthEvent, AuthProvider};
use crate::content::ContentRepository;
use crate::io::{HttpClient, ReqwestHttpClient};
use crate::store::TableStore;
use crate::web::AppState;

/// Wire the repository and auth provider to a backend reached through `http`
pub fn build_state(config: Config, http: Arc<dyn HttpClient>) -> AppState {
    let store = TableStore::new(
        &config.backend.rest_url(),
        &config.backend.anon_key,
        Arc::clone(&http),
    );
    let auth_client = AuthClient::new(&config.backend.auth_url(), &config.backend.anon_key, http);
    let auth = Arc::new(AuthProvider::new(auth_client));
    AppState::new(config, ContentRepository::new(store), auth)
}

async fn log_auth_events(mut events: broadcast::Receiver<AuthEvent>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Ok(AuthEvent::SignedIn { email }) => tracing::info!("Auth: {} signed in", email),
                Ok(AuthEvent::SignedOut { email }) => tracing::info!("Auth: {} signed out", email),
                Ok(AuthEvent::TokenRefreshed { email }) => {
                    tracing::debug!("Auth: token refreshed for {}", email)
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::debug!("Auth event logger lagged by {} events", n)
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

/// Periodically drop sessions nobody has used since their token expired
pub async fn sweep_sessions(
    auth: Arc<AuthProvider>,
    interval: Duration,
    idle: chrono::Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => {
                tracing::debug!("Session sweep cancelled");
                break;
            }
        }

        let dropped = auth.prune_stale(chrono::Utc::now(), idle).await;
        if dropped > 0 {
            tracing::debug!("Session sweep dropped {} idle sessions", dropped);
        }
    }
}

/// Run the site with the given configuration until ctrl-c
pub async fn run(config: Config) -> Result<()> {
    let timeout = Duration::from_secs(config.backend.request_timeout_seconds);
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::with_timeout(timeout)?);
    let cancel = CancellationToken::new();

    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()
        .map_err(|e| SiteError::Config(format!("Invalid bind address: {}", e)))?;

    let sweep_interval = Duration::from_secs(config.auth.sweep_interval_seconds.max(1));
    let session_idle =
        chrono::Duration::seconds(config.auth.session_idle_seconds.min(u64::from(u32::MAX)) as i64);

    let state = build_state(config, http);
    tokio::spawn(log_auth_events(state.auth.subscribe(), cancel.clone()));
    tokio::spawn(sweep_sessions(
        Arc::clone(&state.auth),
        sweep_interval,
        session_idle,
        cancel.clone(),
    ));

    // Setup shutdown handler
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    let router = web::build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Site listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::info!("Site stopped");
    Ok(())
}
