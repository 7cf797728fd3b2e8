//! PostgreSQL-backed `TransportRepository` implementation using Diesel ORM.
//!
//! Creation and phase transitions write the transport row and its history row
//! in one transaction, so `current_phase_id` never disagrees with the newest
//! history entry.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{TransportRepository, TransportRepositoryError, TransportWithPhase};
use crate::domain::{Phase, PhaseHistoryEntry, TrackingNumber, Transport, TransportId};

use super::diesel_error_mapping::{DieselFailure, classify};
use super::models::{
    CorruptRow, NewPhaseHistoryRow, PhaseHistoryRow, PhaseRow, TransportRecord, TransportRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{phase_history, phases, transports};

/// Diesel-backed transport and history storage.
#[derive(Clone)]
pub struct DieselTransportRepository {
    pool: DbPool,
}

impl DieselTransportRepository {
    /// Create a repository drawing connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TransportRepositoryError {
    TransportRepositoryError::connection(error.message())
}

fn map_diesel_error(error: diesel::result::Error) -> TransportRepositoryError {
    match classify(&error) {
        DieselFailure::Connection => {
            TransportRepositoryError::connection("database connection error")
        }
        DieselFailure::UniqueViolation => TransportRepositoryError::query("duplicate key"),
        DieselFailure::ForeignKeyViolation => {
            TransportRepositoryError::query("referenced phase does not exist")
        }
        DieselFailure::Query(message) => TransportRepositoryError::query(message),
    }
}

fn map_corrupt_row(error: CorruptRow) -> TransportRepositoryError {
    TransportRepositoryError::query(error.to_string())
}

fn missing_row() -> TransportRepositoryError {
    TransportRepositoryError::query("transport not found for update")
}

#[async_trait]
impl TransportRepository for DieselTransportRepository {
    async fn create(
        &self,
        transport: &Transport,
        initial_entry: &PhaseHistoryEntry,
    ) -> Result<(), TransportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let record = TransportRecord::from(transport);
        let entry = NewPhaseHistoryRow::from(initial_entry);
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(transports::table)
                    .values(&record)
                    .execute(conn)
                    .await?;
                diesel::insert_into(phase_history::table)
                    .values(&entry)
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| match classify(&error) {
            DieselFailure::UniqueViolation => TransportRepositoryError::duplicate_tracking_number(
                transport.tracking_number.as_str(),
            ),
            _ => map_diesel_error(error),
        })
    }

    async fn find_by_id(&self, id: &TransportId) -> Result<Option<Transport>, TransportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TransportRow> = transports::table
            .filter(transports::id.eq(id.as_uuid()))
            .select(TransportRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Transport::try_from)
            .transpose()
            .map_err(map_corrupt_row)
    }

    async fn find_by_tracking_number(
        &self,
        tracking_number: &TrackingNumber,
    ) -> Result<Option<Transport>, TransportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TransportRow> = transports::table
            .filter(transports::tracking_number.eq(tracking_number.as_str()))
            .select(TransportRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Transport::try_from)
            .transpose()
            .map_err(map_corrupt_row)
    }

    async fn list_with_phase(&self) -> Result<Vec<TransportWithPhase>, TransportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(TransportRow, Option<PhaseRow>)> = transports::table
            .left_join(phases::table)
            .select((TransportRow::as_select(), Option::<PhaseRow>::as_select()))
            .order_by((transports::created_at.desc(), transports::id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|(transport, phase)| {
                Ok(TransportWithPhase {
                    transport: Transport::try_from(transport).map_err(map_corrupt_row)?,
                    current_phase: phase
                        .map(Phase::try_from)
                        .transpose()
                        .map_err(map_corrupt_row)?,
                })
            })
            .collect()
    }

    async fn history(&self, id: &TransportId) -> Result<Vec<PhaseHistoryEntry>, TransportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PhaseHistoryRow> = phase_history::table
            .filter(phase_history::transport_id.eq(id.as_uuid()))
            .select(PhaseHistoryRow::as_select())
            .order_by((phase_history::changed_at.desc(), phase_history::id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(PhaseHistoryEntry::from).collect())
    }

    async fn record_transition(
        &self,
        transport: &Transport,
        entry: &PhaseHistoryEntry,
    ) -> Result<(), TransportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *transport.id.as_uuid();
        let record = TransportRecord::from(transport);
        let entry = NewPhaseHistoryRow::from(entry);
        let updated = conn
            .transaction(|conn| {
                async move {
                    let updated = diesel::update(transports::table.filter(transports::id.eq(id)))
                        .set(&record)
                        .execute(conn)
                        .await?;
                    if updated == 0 {
                        return Ok(false);
                    }
                    diesel::insert_into(phase_history::table)
                        .values(&entry)
                        .execute(conn)
                        .await?;
                    Ok::<_, diesel::result::Error>(true)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        if updated { Ok(()) } else { Err(missing_row()) }
    }

    async fn update(&self, transport: &Transport) -> Result<(), TransportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated =
            diesel::update(transports::table.filter(transports::id.eq(transport.id.as_uuid())))
                .set(TransportRecord::from(transport))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(missing_row());
        }
        Ok(())
    }

    async fn delete(&self, id: &TransportId) -> Result<bool, TransportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *id.as_uuid();
        conn.transaction(|conn| {
            async move {
                diesel::delete(phase_history::table.filter(phase_history::transport_id.eq(id)))
                    .execute(conn)
                    .await?;
                let deleted = diesel::delete(transports::table.filter(transports::id.eq(id)))
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(deleted > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
