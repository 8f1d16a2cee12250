//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{Comments, LoadCommand, LoadQuery, LoginService, Reports, UserAdmin};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserAdmin>,
    pub loads: Arc<dyn LoadCommand>,
    pub loads_query: Arc<dyn LoadQuery>,
    pub comments: Arc<dyn Comments>,
    pub reports: Arc<dyn Reports>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserAdmin>,
    pub loads: Arc<dyn LoadCommand>,
    pub loads_query: Arc<dyn LoadQuery>,
    pub comments: Arc<dyn Comments>,
    pub reports: Arc<dyn Reports>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use loadboard::inbound::http::state::{HttpState, HttpStatePorts};
    /// use loadboard::test_support::in_memory_ports;
    ///
    /// let ports: HttpStatePorts = in_memory_ports().ports;
    /// let state = HttpState::new(ports);
    /// let _login = Arc::clone(&state.login);
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            users,
            loads,
            loads_query,
            comments,
            reports,
        } = ports;
        Self {
            login,
            users,
            loads,
            loads_query,
            comments,
            reports,
        }
    }
}
