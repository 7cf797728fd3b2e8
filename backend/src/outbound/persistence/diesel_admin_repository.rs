//! PostgreSQL-backed `AdminRepository` implementation using Diesel ORM.
//!
//! The `admins.singleton` column is always `true` and carries a unique
//! index; `insert_if_absent` relies on `ON CONFLICT DO NOTHING` against it so
//! concurrent setup attempts create exactly one account.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AdminRepository, AdminRepositoryError};
use crate::domain::{Admin, PasswordHash};

use super::diesel_error_mapping::{DieselFailure, classify};
use super::models::{AdminRow, NewAdminRow};
use super::pool::{DbPool, PoolError};
use super::schema::admins;

/// Diesel-backed operator account storage.
#[derive(Clone)]
pub struct DieselAdminRepository {
    pool: DbPool,
}

impl DieselAdminRepository {
    /// Create a repository drawing connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AdminRepositoryError {
    AdminRepositoryError::connection(error.message())
}

fn map_diesel_error(error: diesel::result::Error) -> AdminRepositoryError {
    match classify(&error) {
        DieselFailure::Connection => AdminRepositoryError::connection("database connection error"),
        DieselFailure::UniqueViolation | DieselFailure::ForeignKeyViolation => {
            AdminRepositoryError::query("constraint violation")
        }
        DieselFailure::Query(message) => AdminRepositoryError::query(message),
    }
}

#[async_trait]
impl AdminRepository for DieselAdminRepository {
    async fn find(&self) -> Result<Option<Admin>, AdminRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<AdminRow> = admins::table
            .filter(admins::singleton.eq(true))
            .select(AdminRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Admin::from))
    }

    async fn insert_if_absent(&self, admin: &Admin) -> Result<bool, AdminRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(admins::table)
            .values(NewAdminRow::from(admin))
            .on_conflict(admins::singleton)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted == 1)
    }

    async fn update_password(
        &self,
        id: &Uuid,
        password_hash: &PasswordHash,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AdminRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(admins::table.filter(admins::id.eq(id)))
            .set((
                admins::password_hash.eq(password_hash.as_str()),
                admins::updated_at.eq(updated_at),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(AdminRepositoryError::query("admin not found for update"));
        }
        Ok(())
    }
}
