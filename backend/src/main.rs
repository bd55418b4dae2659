//! Registrar entry-point: loads configuration, prepares the store and serves
//! the HTTP API.

use std::io;

use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use registrar::bootstrap::AppSettings;
use registrar::inbound::http::session_config::{BuildMode, session_settings_from_env};
use registrar::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use registrar::server::{ServerConfig, build_http_state, create_server};

fn other(context: &str, error: impl std::fmt::Display) -> io::Error {
    io::Error::other(format!("{context}: {error}"))
}

async fn connect(settings: &AppSettings, url: &str) -> io::Result<DbPool> {
    let applied = run_migrations(url)
        .await
        .map_err(|error| other("apply migrations", error))?;
    info!(applied, "database schema ready");
    let pool_size = settings
        .pool_max_size()
        .map_err(|error| other("configure pool", error))?;
    DbPool::new(PoolConfig::new(url).with_max_size(pool_size))
        .await
        .map_err(|error| other("create database pool", error))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|error| other("load configuration", error))?;
    let bind_addr = settings
        .bind_address()
        .map_err(|error| other("configure listener", error))?;
    let admin = settings
        .admin_details()
        .map_err(|error| other("configure default admin", error))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|error| other("configure sessions", error))?;

    let mut config = ServerConfig::new(session, bind_addr);
    match settings.database_url() {
        Some(url) => config = config.with_db_pool(connect(&settings, url).await?),
        None => warn!("no database configured; using the in-memory store"),
    }

    let http_state = build_http_state(&config, admin.as_ref())
        .await
        .map_err(|error| other("prepare application state", error))?;

    info!(%bind_addr, persistent = config.is_persistent(), "registrar listening");
    create_server(config, http_state)?.await
}
