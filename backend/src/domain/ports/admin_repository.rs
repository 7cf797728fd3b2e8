//! Port for the singleton operator account.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Admin, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised by admin repository adapters.
    pub enum AdminRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "admin repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "admin repository query failed: {message}",
    }
}

/// Port for operator account storage. At most one account exists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// The operator account, if set up.
    async fn find(&self) -> Result<Option<Admin>, AdminRepositoryError>;

    /// Insert `admin` only when no account exists yet.
    ///
    /// Returns `false`, leaving storage untouched, when an account exists.
    async fn insert_if_absent(&self, admin: &Admin) -> Result<bool, AdminRepositoryError>;

    async fn update_password(
        &self,
        id: &Uuid,
        password_hash: &PasswordHash,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AdminRepositoryError>;
}
