//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ServerConfig, ServerSettings};
pub(crate) use state_builders::{BackendPorts, build_ports};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use loadboard::Trace;
#[cfg(debug_assertions)]
use loadboard::doc::ApiDoc;
use loadboard::inbound::http::configure_api;
use loadboard::inbound::http::health::{HealthState, live, ready};
use loadboard::inbound::http::session_config::SessionSettings;
use loadboard::inbound::http::state::HttpState;
use loadboard::inbound::ws;
use loadboard::inbound::ws::state::{OriginPolicy, WsState};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
    session: SessionSettings,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
        session,
    } = deps;

    let api = web::scope("/api/v1").configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .wrap(session.middleware())
        .wrap(Trace)
        .service(api)
        .service(ws::ws_entry)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server over `ports`.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is initialised.
/// - `config`: pre-built [`ServerConfig`] containing session and binding settings.
/// - `ports`: services and event hub from [`build_ports`].
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket or starting the server fails.
pub(crate) fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
    ports: BackendPorts,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        transitions: _,
        allowed_origins,
    } = config;
    let session = SessionSettings {
        key,
        cookie_secure,
        same_site,
    };
    let http_state = web::Data::new(HttpState::new(ports.http.clone()));
    let ws_state = web::Data::new(WsState::new(
        ports.http.users.clone(),
        ports.events.clone(),
        OriginPolicy::new(allowed_origins),
    ));

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
            session: session.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
