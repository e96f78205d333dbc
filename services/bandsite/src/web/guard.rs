//! Admin route guard
//!
//! Resolves the session cookie through the [`AuthProvider`](crate::auth::AuthProvider)
//! and injects the signed-in [`Editor`] into request extensions. Page routes
//! without a session are redirected to the login page, API routes get a 401.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use super::AppState;
use crate::auth::Session;
use crate::config::AuthConfig;
use crate::SiteError;

pub const LOGIN_PATH: &str = "/admin/login";

/// The editor making an admin request
#[derive(Debug, Clone)]
pub struct Editor {
    pub session_id: String,
    pub session: Session,
}

/// Read the session id from the request cookies
pub fn session_id(jar: &CookieJar, cookie_name: &str) -> Option<String> {
    jar.get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Cookie carrying a new session id
pub fn session_cookie(config: &AuthConfig, session_id: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookie)
        .build()
}

/// Add the session cookie to the response jar
pub fn remember(jar: CookieJar, config: &AuthConfig, session_id: String) -> CookieJar {
    jar.add(session_cookie(config, session_id))
}

/// Expire the session cookie if the request carried one
pub fn forget(jar: CookieJar, config: &AuthConfig) -> CookieJar {
    jar.remove(Cookie::build((config.cookie_name.clone(), "")).path("/"))
}

fn reject(path: &str, jar: CookieJar, auth: &AuthConfig) -> Response {
    let response = if path.starts_with("/admin/api") {
        SiteError::Unauthorized.into_response()
    } else {
        Redirect::to(LOGIN_PATH).into_response()
    };
    (forget(jar, auth), response).into_response()
}

pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_config = &state.config.auth;
    let path = request.uri().path().to_string();

    let Some(session_id) = session_id(&jar, &auth_config.cookie_name) else {
        tracing::debug!("No session cookie for {}", path);
        return reject(&path, jar, auth_config);
    };

    match state.auth.session(&session_id).await {
        Some(session) => {
            request.extensions_mut().insert(Editor {
                session_id,
                session,
            });
            next.run(request).await
        }
        None => {
            tracing::debug!("Unknown or expired session for {}", path);
            reject(&path, jar, auth_config)
        }
    }
}
