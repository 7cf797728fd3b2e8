//! PostgreSQL-backed `PhaseRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PhaseRepository, PhaseRepositoryError};
use crate::domain::{Phase, PhaseId};

use super::diesel_error_mapping::{DieselFailure, classify};
use super::models::{CorruptRow, PhaseRecord, PhaseRow};
use super::pool::{DbPool, PoolError};
use super::schema::{phases, transports};

/// Diesel-backed phase catalogue storage.
#[derive(Clone)]
pub struct DieselPhaseRepository {
    pool: DbPool,
}

impl DieselPhaseRepository {
    /// Create a repository drawing connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PhaseRepositoryError {
    PhaseRepositoryError::connection(error.message())
}

fn map_diesel_error(error: diesel::result::Error) -> PhaseRepositoryError {
    from_failure(classify(&error))
}

fn from_failure(failure: DieselFailure) -> PhaseRepositoryError {
    match failure {
        DieselFailure::Connection => PhaseRepositoryError::connection("database connection error"),
        DieselFailure::UniqueViolation => PhaseRepositoryError::query("duplicate phase id"),
        DieselFailure::ForeignKeyViolation => {
            PhaseRepositoryError::query("phase is referenced by a transport")
        }
        DieselFailure::Query(message) => PhaseRepositoryError::query(message),
    }
}

fn map_corrupt_row(error: CorruptRow) -> PhaseRepositoryError {
    PhaseRepositoryError::query(error.to_string())
}

fn rows_to_phases(rows: Vec<PhaseRow>) -> Result<Vec<Phase>, PhaseRepositoryError> {
    rows.into_iter()
        .map(|row| Phase::try_from(row).map_err(map_corrupt_row))
        .collect()
}

#[async_trait]
impl PhaseRepository for DieselPhaseRepository {
    async fn list(&self) -> Result<Vec<Phase>, PhaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PhaseRow> = phases::table
            .select(PhaseRow::as_select())
            .order_by((phases::sort_order, phases::created_at, phases::id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows_to_phases(rows)
    }

    async fn find_by_id(&self, id: &PhaseId) -> Result<Option<Phase>, PhaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PhaseRow> = phases::table
            .filter(phases::id.eq(id.as_uuid()))
            .select(PhaseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Phase::try_from)
            .transpose()
            .map_err(map_corrupt_row)
    }

    async fn first(&self) -> Result<Option<Phase>, PhaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PhaseRow> = phases::table
            .select(PhaseRow::as_select())
            .order_by((phases::sort_order, phases::created_at, phases::id))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Phase::try_from)
            .transpose()
            .map_err(map_corrupt_row)
    }

    async fn count(&self) -> Result<u64, PhaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = phases::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(total).map_err(|_| PhaseRepositoryError::query("negative phase count"))
    }

    async fn insert(&self, phase: &Phase) -> Result<(), PhaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(phases::table)
            .values(PhaseRecord::from(phase))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, phase: &Phase) -> Result<(), PhaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(phases::table.filter(phases::id.eq(phase.id.as_uuid())))
            .set(PhaseRecord::from(phase))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(PhaseRepositoryError::query("phase not found for update"));
        }
        Ok(())
    }

    async fn delete(&self, id: &PhaseId) -> Result<bool, PhaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(phases::table.filter(phases::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(|error| match classify(&error) {
                DieselFailure::ForeignKeyViolation => PhaseRepositoryError::in_use(id.to_string()),
                other => from_failure(other),
            })?;
        Ok(deleted > 0)
    }

    async fn is_current_for_any_transport(&self, id: &PhaseId) -> Result<bool, PhaseRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            transports::table.filter(transports::current_phase_id.eq(id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}
