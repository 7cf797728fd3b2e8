//! Driving port for operator authentication.
//!
//! Session storage stays in the inbound adapter; this port only issues and
//! checks [`SessionGrant`] values and mints the [`Operator`] capability.

use async_trait::async_trait;

use crate::domain::{AccessStatus, Error, Operator, SessionGrant};

/// Result of a successful setup or login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub grant: SessionGrant,
    pub username: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn check_status(&self, grant: Option<SessionGrant>) -> Result<AccessStatus, Error>;

    /// Create the operator account on a fresh deployment.
    async fn setup(&self, username: &str, password: &str) -> Result<SignedIn, Error>;

    /// Check the operator's credentials and issue a grant.
    ///
    /// A deployment without an operator reports `setup_required` before the
    /// credentials are looked at.
    async fn login(&self, username: &str, password: &str) -> Result<SignedIn, Error>;

    async fn change_password(
        &self,
        operator: &Operator,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), Error>;

    /// Turn a session grant into the operator capability.
    async fn authorize(&self, grant: Option<SessionGrant>) -> Result<Operator, Error>;
}
