//! Configuration types for the band site

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const BACKEND_URL_ENV: &str = "BANDSITE_BACKEND_URL";
pub const BACKEND_KEY_ENV: &str = "BANDSITE_BACKEND_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

/// Hosted table store and auth endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl BackendConfig {
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url.trim_end_matches('/'))
    }

    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url.trim_end_matches('/'))
    }
}

/// Copy and behaviour of the public pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_name")]
    pub name: String,
    #[serde(default = "default_booking_email")]
    pub booking_email: String,
    #[serde(default = "default_countdown_interval")]
    pub countdown_interval_ms: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            booking_email: default_booking_email(),
            countdown_interval_ms: default_countdown_interval(),
        }
    }
}

/// Admin session cookie settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default)]
    pub secure_cookie: bool,
    /// How often signed-in sessions are swept
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Sessions whose token expired longer ago than this are dropped
    #[serde(default = "default_session_idle")]
    pub session_idle_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            secure_cookie: false,
            sweep_interval_seconds: default_sweep_interval(),
            session_idle_seconds: default_session_idle(),
        }
    }
}

impl Config {
    /// Fill backend credentials from the environment when the file leaves them empty
    pub fn resolve_secrets(&mut self) -> crate::Result<()> {
        self.resolve_secrets_with(|name| std::env::var(name).ok())
    }

    pub fn resolve_secrets_with<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.backend.url.is_empty() {
            if let Some(url) = lookup(BACKEND_URL_ENV) {
                self.backend.url = url;
            }
        }
        if self.backend.anon_key.is_empty() {
            if let Some(key) = lookup(BACKEND_KEY_ENV) {
                self.backend.anon_key = key;
            }
        }

        if self.backend.url.is_empty() {
            return Err(crate::SiteError::Config(format!(
                "backend.url is not set (config file or {})",
                BACKEND_URL_ENV
            )));
        }
        if self.backend.anon_key.is_empty() {
            return Err(crate::SiteError::Config(format!(
                "backend.anon_key is not set (config file or {})",
                BACKEND_KEY_ENV
            )));
        }
        Ok(())
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    10
}

fn default_site_name() -> String {
    "Elite Klan".to_string()
}

fn default_booking_email() -> String {
    "booking@eliteklan.com".to_string()
}

fn default_countdown_interval() -> u64 {
    1000
}

fn default_cookie_name() -> String {
    "bandsite_session".to_string()
}

fn default_sweep_interval() -> u64 {
    300
}

fn default_session_idle() -> u64 {
    12 * 3_600
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::SiteError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}
