//! Builders wiring Diesel repositories and the notifier into driving ports.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::info;

use tracker_backend::domain::ports::{LogOnlyNotifier, Notifier, TransportLifecycle};
use tracker_backend::domain::{
    AccessGateService, NotificationDispatcher, PhaseCatalogService, TransportLifecycleService,
};
use tracker_backend::inbound::http::state::HttpState;
use tracker_backend::outbound::email::HttpEmailNotifier;
use tracker_backend::outbound::persistence::{
    DbPool, DieselAdminRepository, DieselPhaseRepository, DieselTransportRepository,
};

use super::ServerConfig;

fn lifecycle_with<N: Notifier + 'static>(
    pool: &DbPool,
    phases: Arc<DieselPhaseRepository>,
    notifier: N,
    public_base_url: &str,
    clock: Arc<dyn Clock>,
) -> Arc<dyn TransportLifecycle> {
    Arc::new(TransportLifecycleService::new(
        phases,
        Arc::new(DieselTransportRepository::new(pool.clone())),
        NotificationDispatcher::new(Arc::new(notifier), public_base_url),
        clock,
    ))
}

/// Build the transport lifecycle port with the configured notifier.
///
/// # Errors
/// Returns [`std::io::Error`] when the email client cannot be constructed.
fn build_transport_lifecycle(
    config: &ServerConfig,
    phases: Arc<DieselPhaseRepository>,
    clock: Arc<dyn Clock>,
) -> std::io::Result<Arc<dyn TransportLifecycle>> {
    match &config.email {
        Some(email) => {
            let notifier = HttpEmailNotifier::new(email.clone())
                .map_err(|e| std::io::Error::other(format!("email notifier setup failed: {e}")))?;
            info!(api_base = %email.api_base, "customer notifications sent by email");
            Ok(lifecycle_with(
                &config.db_pool,
                phases,
                notifier,
                &config.public_base_url,
                clock,
            ))
        }
        None => {
            info!("no email API key configured; customer notifications are logged only");
            Ok(lifecycle_with(
                &config.db_pool,
                phases,
                LogOnlyNotifier,
                &config.public_base_url,
                clock,
            ))
        }
    }
}

/// Construct the handler state from the configured pool.
///
/// # Errors
/// Propagates notifier construction failures.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let phases = Arc::new(DieselPhaseRepository::new(config.db_pool.clone()));
    let admins = Arc::new(DieselAdminRepository::new(config.db_pool.clone()));

    let transports = build_transport_lifecycle(config, Arc::clone(&phases), Arc::clone(&clock))?;
    Ok(HttpState::new(
        Arc::new(PhaseCatalogService::new(phases, Arc::clone(&clock))),
        transports,
        Arc::new(AccessGateService::new(admins, clock)),
    ))
}
