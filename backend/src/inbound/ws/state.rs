//! Shared WebSocket adapter state.
//!
//! The adapter depends on ports only: [`UserAdmin`] resolves the session to
//! an actor and [`LoadEventSource`] supplies the change stream.

use std::sync::Arc;

use url::Url;

use crate::domain::ports::{LoadEventSource, UserAdmin};

/// Browser origins allowed to open the feed.
///
/// `http://localhost:<port>` with a non-zero port is always accepted for
/// development front ends; anything else must match a configured origin's
/// scheme, host and port exactly.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: Vec<Url>,
}

impl OriginPolicy {
    /// Policy accepting `allowed` plus local development origins.
    pub fn new(allowed: Vec<Url>) -> Self {
        Self { allowed }
    }

    /// Returns true when `origin` may open a WebSocket.
    pub fn allows(&self, origin: &Url) -> bool {
        let Some(host) = origin.host_str() else {
            return false;
        };
        if origin.scheme() == "http" && host == "localhost" {
            return matches!(origin.port(), Some(port) if port != 0);
        }
        self.allowed.iter().any(|allowed| {
            allowed.scheme() == origin.scheme()
                && allowed.host_str() == Some(host)
                && allowed.port_or_known_default() == origin.port_or_known_default()
        })
    }
}

/// Dependency bundle for the WebSocket entry point.
#[derive(Clone)]
pub struct WsState {
    pub users: Arc<dyn UserAdmin>,
    pub events: Arc<dyn LoadEventSource>,
    pub origins: OriginPolicy,
}

impl WsState {
    /// Construct state from explicit port implementations.
    pub fn new(
        users: Arc<dyn UserAdmin>,
        events: Arc<dyn LoadEventSource>,
        origins: OriginPolicy,
    ) -> Self {
        Self {
            users,
            events,
            origins,
        }
    }
}
