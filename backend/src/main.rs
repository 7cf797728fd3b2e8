//! Backend entry-point: loads settings, prepares the database and serves the API.

mod server;

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use tracker_backend::inbound::http::health::HealthState;
use tracker_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use tracker_backend::outbound::persistence::{DbPool, PoolConfig};
use tracker_backend::settings::TrackerSettings;
use tracker_backend::startup::{migrate_on_startup, seed_phases_on_startup};

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

    let settings = TrackerSettings::load()
        .map_err(|e| io::Error::other(format!("failed to load settings: {e}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| io::Error::other(format!("invalid session configuration: {e}")))?;
    info!(fingerprint = %session.key_fingerprint(), "session key loaded");

    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let database_url = settings.database_url().map_err(io::Error::other)?;
    migrate_on_startup(&settings, database_url)
        .await
        .map_err(io::Error::other)?;

    let mut pool_config = PoolConfig::new(database_url);
    if let Some(max_size) = settings.db_max_connections {
        pool_config = pool_config.with_max_size(max_size);
    }
    let db_pool = DbPool::new(pool_config)
        .await
        .map_err(|e| io::Error::other(format!("database pool setup failed: {e}")))?;
    seed_phases_on_startup(&settings, &db_pool)
        .await
        .map_err(io::Error::other)?;

    let email = settings.email_api().map_err(io::Error::other)?;
    let config = ServerConfig::new(session, bind_addr, db_pool, settings.public_base_url())
        .with_email(email);

    let health_state = web::Data::new(HealthState::new());
    info!(addr = %config.bind_addr(), "starting HTTP server");
    let server = create_server(health_state, config)?;
    server.await
}
