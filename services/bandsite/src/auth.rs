//! Editor authentication against the backend auth endpoint
//!
//! [`AuthClient`] speaks the password-grant token API. [`AuthProvider`]
//! keeps signed-in sessions for the process, keyed by the opaque id stored in
//! the admin session cookie, and broadcasts [`AuthEvent`]s when they change.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::{Result, SiteError};
use crate::io::HttpClient;
use crate::store::error_message;

const SIGN_IN_FAILED: &str = "No fue posible iniciar sesión.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A signed-in editor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn email(&self) -> &str {
        self.user.email.as_deref().unwrap_or(&self.user.id)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(|| now + Duration::seconds(self.expires_in.unwrap_or(3_600)));
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Client for the backend auth API
#[derive(Clone)]
pub struct AuthClient {
    auth_url: String,
    api_key: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("auth_url", &self.auth_url)
            .finish()
    }
}

impl AuthClient {
    pub fn new(auth_url: &str, api_key: &str, http: Arc<dyn HttpClient>) -> Self {
        Self {
            auth_url: auth_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
        }
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(SiteError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let url = format!("{}/token?grant_type=password", self.auth_url);
        let body = json!({ "email": email.trim(), "password": password });
        self.token_request(&url, &body).await
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        let url = format!("{}/token?grant_type=refresh_token", self.auth_url);
        let body = json!({ "refresh_token": refresh_token });
        self.token_request(&url, &body).await
    }

    async fn token_request(&self, url: &str, body: &serde_json::Value) -> Result<Session> {
        let headers = [("apikey", self.api_key.as_str())];
        let response = self.http.post_json(url, &headers, body).await?;

        if !response.is_success() {
            let message = if response.body.trim().is_empty() {
                SIGN_IN_FAILED.to_string()
            } else {
                error_message(&response.body)
            };
            return Err(SiteError::Auth(message));
        }

        let token: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|_| SiteError::Auth(SIGN_IN_FAILED.to_string()))?;
        Ok(token.into_session(Utc::now()))
    }

    pub async fn get_user(&self, access_token: &str) -> Result<User> {
        let url = format!("{}/user", self.auth_url);
        let bearer = format!("Bearer {}", access_token);
        let headers = [
            ("apikey", self.api_key.as_str()),
            ("Authorization", bearer.as_str()),
        ];
        let response = self.http.get(&url, &headers).await?;
        if !response.is_success() {
            return Err(SiteError::Auth(error_message(&response.body)));
        }
        Ok(serde_json::from_str(&response.body)?)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let url = format!("{}/logout", self.auth_url);
        let bearer = format!("Bearer {}", access_token);
        let headers = [
            ("apikey", self.api_key.as_str()),
            ("Authorization", bearer.as_str()),
        ];
        let response = self.http.post_json(&url, &headers, &json!({})).await?;
        if !response.is_success() {
            return Err(SiteError::Auth(error_message(&response.body)));
        }
        Ok(())
    }
}

/// Session change notifications
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn { email: String },
    SignedOut { email: String },
    TokenRefreshed { email: String },
}

/// Process-wide session state
#[derive(Debug)]
pub struct AuthProvider {
    client: AuthClient,
    sessions: RwLock<HashMap<String, Session>>,
    /// Held while a refresh token is being exchanged
    refreshing: Mutex<()>,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthProvider {
    pub fn new(client: AuthClient) -> Self {
        let (events, _) = broadcast::channel(32);
        Self {
            client,
            sessions: RwLock::new(HashMap::new()),
            refreshing: Mutex::new(()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: AuthEvent) {
        // No receivers is fine
        let _ = self.events.send(event);
    }

    /// Sign in and return the new session id
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, Session)> {
        let session = self.client.sign_in_with_password(email, password).await?;
        let id = uuid::Uuid::new_v4().to_string();

        self.sessions
            .write()
            .await
            .insert(id.clone(), session.clone());
        info!("Editor {} signed in", session.email());
        self.emit(AuthEvent::SignedIn {
            email: session.email().to_string(),
        });
        Ok((id, session))
    }

    /// Drop the local session, then revoke it remotely
    ///
    /// The local session is gone even when the remote call fails; that
    /// failure is still returned.
    pub async fn logout(&self, session_id: &str) -> Result<()> {
        let Some(session) = self.sessions.write().await.remove(session_id) else {
            debug!("Logout for unknown session");
            return Ok(());
        };

        self.emit(AuthEvent::SignedOut {
            email: session.email().to_string(),
        });
        info!("Editor {} signed out", session.email());

        self.client.sign_out(&session.access_token).await
    }

    /// Look up a session, refreshing it when its token has expired
    ///
    /// Refresh tokens are single use, so concurrent lookups of an expired
    /// session share one refresh.
    pub async fn session(&self, session_id: &str) -> Option<Session> {
        let session = self.sessions.read().await.get(session_id).cloned()?;
        if !session.is_expired(Utc::now()) {
            return Some(session);
        }

        let _refreshing = self.refreshing.lock().await;
        let session = self.sessions.read().await.get(session_id).cloned()?;
        if !session.is_expired(Utc::now()) {
            return Some(session);
        }

        let result = self.client.refresh_session(&session.refresh_token).await;

        // A logout while the refresh was in flight wins
        let mut sessions = self.sessions.write().await;
        let current = sessions
            .get(session_id)
            .is_some_and(|stored| stored.refresh_token == session.refresh_token);
        if !current {
            debug!("Session for {} ended during refresh", session.email());
            return None;
        }

        match result {
            Ok(refreshed) => {
                sessions.insert(session_id.to_string(), refreshed.clone());
                drop(sessions);
                debug!("Refreshed session for {}", refreshed.email());
                self.emit(AuthEvent::TokenRefreshed {
                    email: refreshed.email().to_string(),
                });
                Some(refreshed)
            }
            Err(e) => {
                sessions.remove(session_id);
                drop(sessions);
                warn!("Session refresh failed for {}: {}", session.email(), e);
                self.emit(AuthEvent::SignedOut {
                    email: session.email().to_string(),
                });
                None
            }
        }
    }

    /// Drop sessions whose token expired more than `idle` before `now`
    ///
    /// Returns how many sessions were dropped.
    pub async fn prune_stale(&self, now: DateTime<Utc>, idle: Duration) -> usize {
        let stale: Vec<Session> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<String> = sessions
                .iter()
                .filter(|(_, session)| session.expires_at + idle <= now)
                .map(|(id, _)| id.clone())
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for session in &stale {
            info!("Dropping idle session for {}", session.email());
            self.emit(AuthEvent::SignedOut {
                email: session.email().to_string(),
            });
        }
        stale.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    #[cfg(test)]
    pub(crate) async fn insert_session(&self, id: &str, session: Session) {
        self.sessions.write().await.insert(id.to_string(), session);
    }
}
