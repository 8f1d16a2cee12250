//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST handler under `/api/v1` plus the health
//! probes, the session cookie security scheme, and the WebSocket push
//! payload (which no REST path references). Request and response schemas
//! are collected from the handler annotations.
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{ChangeKind, Error, ErrorCode, Load, LoadStatus, Role};
use crate::inbound::ws::messages::ChangeMessage;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Loadboard API",
        description = "Session-authenticated load tracking, user administration and reports."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::session_user,
        crate::inbound::http::loads::list_loads,
        crate::inbound::http::loads::page_loads,
        crate::inbound::http::loads::list_loads_by_status,
        crate::inbound::http::loads::get_load,
        crate::inbound::http::loads::create_load,
        crate::inbound::http::loads::update_load,
        crate::inbound::http::loads::delete_load,
        crate::inbound::http::comments::list_comments,
        crate::inbound::http::comments::add_comment,
        crate::inbound::http::reports::dashboard,
        crate::inbound::http::reports::daily_allocation,
        crate::inbound::http::reports::export_loads,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode, Load, LoadStatus, Role, ChangeKind, ChangeMessage)),
    tags(
        (name = "auth", description = "Sign-in and session"),
        (name = "loads", description = "Load lifecycle and assignment"),
        (name = "comments", description = "Per-load discussion"),
        (name = "reports", description = "Dashboards, allocation and exports"),
        (name = "users", description = "User administration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
