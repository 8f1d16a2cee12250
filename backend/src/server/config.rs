//! HTTP server configuration object and helpers.
//!
//! [`ServerSettings`] is layered by OrthoConfig from `LOADBOARD_*`
//! environment variables and command-line flags; [`ServerConfig`] is the
//! validated form the server is built from.

use std::ffi::OsString;
use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use loadboard::domain::{
    AdminSeed, Email, Password, TransitionPolicy, UserName, UserValidationError,
};
use loadboard::inbound::http::session_config::SessionSettings;
use loadboard::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ADMIN_EMAIL: &str = "admin@workflow.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_ADMIN_NAME: &str = "Administrator";

/// Settings read at start-up.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "LOADBOARD")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory stores are used when absent.
    pub database_url: Option<String>,
    /// `strict` (default) or `permissive` status transitions.
    pub transitions: Option<String>,
    /// Seed administrator created when no admin exists.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: Option<String>,
    /// Comma-separated browser origins allowed to open `/ws`.
    pub allowed_origins: Option<String>,
}

/// Invalid start-up settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid LOADBOARD_BIND_ADDR '{value}': {message}")]
    BindAddr { value: String, message: String },
    #[error("invalid LOADBOARD_TRANSITIONS: {0}")]
    Transitions(String),
    #[error("invalid seed administrator: {0}")]
    AdminSeed(String),
    #[error("invalid origin '{value}' in LOADBOARD_ALLOWED_ORIGINS: {message}")]
    Origin { value: String, message: String },
    #[error("failed to load configuration: {0}")]
    Load(String),
}

impl ServerSettings {
    /// Layer command-line `args` over `LOADBOARD_*` environment variables.
    pub fn from_args(args: impl IntoIterator<Item = OsString>) -> Result<Self, SettingsError> {
        Self::load_from_iter(args).map_err(|err| SettingsError::Load(err.to_string()))
    }

    /// Listen address, defaulting to all interfaces on port 8080.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    pub fn transitions(&self) -> Result<TransitionPolicy, SettingsError> {
        self.transitions
            .as_deref()
            .map_or(Ok(TransitionPolicy::default()), str::parse::<TransitionPolicy>)
            .map_err(SettingsError::Transitions)
    }

    /// Seed administrator identity.
    pub fn admin_seed(&self) -> Result<AdminSeed, SettingsError> {
        let seed_error = |err: UserValidationError| SettingsError::AdminSeed(err.to_string());
        Ok(AdminSeed {
            email: Email::new(self.admin_email.as_deref().unwrap_or(DEFAULT_ADMIN_EMAIL))
                .map_err(seed_error)?,
            name: UserName::new(self.admin_name.as_deref().unwrap_or(DEFAULT_ADMIN_NAME))
                .map_err(seed_error)?,
            password: Password::new(
                self.admin_password
                    .as_deref()
                    .unwrap_or(DEFAULT_ADMIN_PASSWORD),
            )
            .map_err(|err| SettingsError::AdminSeed(err.to_string()))?,
        })
    }

    /// Configured WebSocket origins.
    pub fn allowed_origins(&self) -> Result<Vec<Url>, SettingsError> {
        self.allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| {
                Url::parse(value).map_err(|err| SettingsError::Origin {
                    value: value.to_owned(),
                    message: err.to_string(),
                })
            })
            .collect()
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) transitions: TransitionPolicy,
    pub(crate) allowed_origins: Vec<Url>,
}

impl ServerConfig {
    /// Construct a server configuration from the session settings.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            transitions: TransitionPolicy::default(),
            allowed_origins: Vec::new(),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server uses the Diesel repositories instead of the
    /// in-memory stores.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_transitions(mut self, transitions: TransitionPolicy) -> Self {
        self.transitions = transitions;
        self
    }

    /// Browser origins accepted on `/ws` besides local development ones.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<Url>) -> Self {
        self.allowed_origins = origins;
        self
    }
}
