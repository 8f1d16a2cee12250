//! Backend entry-point: wires REST endpoints, WebSocket entry, and OpenAPI docs.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use loadboard::domain::ensure_default_admin;
use loadboard::inbound::http::health::HealthState;
use loadboard::inbound::http::session_config::{BuildMode, session_settings_from_env};
use loadboard::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

use server::{ServerConfig, ServerSettings, build_ports, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::from_args(std::env::args_os())?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::current())
        .wrap_err("invalid session configuration")?;

    let mut config = ServerConfig::new(session, settings.bind_addr()?)
        .with_transitions(settings.transitions()?)
        .with_allowed_origins(settings.allowed_origins()?);
    if let Some(url) = settings.database_url.as_deref() {
        run_pending_migrations(url)
            .await
            .wrap_err("database migrations failed")?;
        let pool = DbPool::new(PoolConfig::new(url))
            .await
            .wrap_err("failed to create database pool")?;
        config = config.with_db_pool(pool);
    } else {
        warn!("LOADBOARD_DATABASE_URL not set; using in-memory stores");
    }

    let ports = build_ports(&config);
    let seeded = ensure_default_admin(
        ports.users.as_ref(),
        ports.hasher.as_ref(),
        ports.clock.as_ref(),
        settings.admin_seed()?,
    )
    .await
    .map_err(|err| eyre!("failed to seed the administrator: {err}"))?;
    if let Some(admin) = seeded {
        info!(email = %admin.email, "default administrator created");
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config, ports).wrap_err("failed to start server")?;
    server.await.wrap_err("server terminated")
}
