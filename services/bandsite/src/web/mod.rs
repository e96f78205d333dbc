//! HTTP surface: public pages, JSON API and the admin dashboard

pub mod admin;
pub mod api;
pub mod guard;
pub mod layout;
pub mod pages;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::auth::AuthProvider;
use crate::config::Config;
use crate::content::ContentRepository;

/// State shared by every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Anonymous repository for public reads
    pub repository: ContentRepository,
    pub auth: Arc<AuthProvider>,
}

impl AppState {
    pub fn new(config: Config, repository: ContentRepository, auth: Arc<AuthProvider>) -> Self {
        Self {
            config: Arc::new(config),
            repository,
            auth,
        }
    }
}

/// Build the site's axum router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/musica", get(pages::music))
        .route("/shows", get(pages::shows))
        .route("/media", get(pages::media))
        .route("/contacto", get(pages::contact).post(pages::submit_contact))
        .route("/epk", get(pages::epk))
        .route("/api/shows", get(api::shows))
        .route("/api/releases", get(api::releases))
        .route("/api/media", get(api::media))
        .route("/api/settings", get(api::settings))
        .route("/api/next-show", get(api::next_show))
        .route("/api/countdown", get(api::countdown))
        .route("/health", get(api::health))
        .route("/admin", get(admin::index))
        .route("/admin/login", get(admin::login_page).post(admin::login))
        .route("/admin/logout", post(admin::logout))
        .merge(admin::protected_router(state.clone()))
        .with_state(state)
}
