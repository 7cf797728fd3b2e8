//! Database preparation performed before the server accepts requests.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use thiserror::Error;
use tracing::info;

use crate::domain::ports::PhaseRepository;
use crate::domain::{Error, PhaseCatalogService};
use crate::outbound::persistence::{
    DbPool, DieselPhaseRepository, MigrationError, run_pending_migrations,
};
use crate::settings::TrackerSettings;

/// Errors returned while preparing the database on startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("schema migration failed: {0}")]
    Migrations(#[from] MigrationError),
    #[error("phase catalogue seeding failed: {0}")]
    Seeding(#[from] Error),
}

/// Apply embedded migrations unless disabled.
///
/// Returns the number of migrations applied, or `None` when skipped.
pub async fn migrate_on_startup(
    settings: &TrackerSettings,
    database_url: &str,
) -> Result<Option<usize>, StartupError> {
    if !settings.run_migrations {
        info!(reason = "disabled", "database migrations skipped");
        return Ok(None);
    }
    Ok(Some(run_pending_migrations(database_url).await?))
}

/// Insert the default phase catalogue when enabled and the table is empty.
///
/// Returns the number of phases inserted, or `None` when seeding is disabled.
pub async fn seed_phases_on_startup(
    settings: &TrackerSettings,
    db_pool: &DbPool,
) -> Result<Option<usize>, StartupError> {
    seed_catalogue(
        settings.seed_phases,
        Arc::new(DieselPhaseRepository::new(db_pool.clone())),
        Arc::new(DefaultClock),
    )
    .await
}

async fn seed_catalogue<P: PhaseRepository>(
    enabled: bool,
    phases: Arc<P>,
    clock: Arc<dyn Clock>,
) -> Result<Option<usize>, StartupError> {
    if !enabled {
        info!(reason = "disabled", "phase catalogue seeding skipped");
        return Ok(None);
    }
    let inserted = PhaseCatalogService::new(phases, clock)
        .seed_default_phases()
        .await?;
    if inserted == 0 {
        info!(reason = "catalogue not empty", "phase catalogue seeding skipped");
    }
    Ok(Some(inserted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::default_catalogue;
    use crate::test_support::{InMemoryStore, MutableClock};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn clock() -> Arc<dyn Clock> {
        Arc::new(MutableClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
                .single()
                .expect("valid timestamp"),
        ))
    }

    #[rstest]
    #[tokio::test]
    async fn disabled_seeding_leaves_catalogue_untouched() {
        let store = Arc::new(InMemoryStore::new());

        let outcome = seed_catalogue(false, Arc::clone(&store), clock())
            .await
            .expect("skipping succeeds");

        assert_eq!(outcome, None);
        assert_eq!(store.count().await.expect("count"), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn seeding_runs_once() {
        let store = Arc::new(InMemoryStore::new());

        let first = seed_catalogue(true, Arc::clone(&store), clock())
            .await
            .expect("first run seeds");
        let second = seed_catalogue(true, Arc::clone(&store), clock())
            .await
            .expect("second run is a no-op");

        assert_eq!(first, Some(default_catalogue().len()));
        assert_eq!(second, Some(0));
        assert_eq!(
            store.count().await.expect("count"),
            default_catalogue().len() as u64
        );
    }
}
