//! Operator access service implementing [`AccessGate`].
//!
//! There is exactly one operator account. It is created once through
//! [`AccessGate::setup`]; afterwards sessions are issued by login and checked
//! by [`AccessGate::authorize`], which mints the [`Operator`] capability.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{AccessGate, AdminRepository, AdminRepositoryError, SignedIn};
use crate::domain::{
    AccessStatus, Admin, CredentialValidationError, Error, LoginCredentials, NewPassword,
    Operator, PasswordHash, SessionGrant,
};

/// Access gate over an [`AdminRepository`].
pub struct AccessGateService<A> {
    admins: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<A> Clone for AccessGateService<A> {
    fn clone(&self) -> Self {
        Self {
            admins: Arc::clone(&self.admins),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<A> AccessGateService<A> {
    /// Create a gate over `admins`, stamping grants with `clock`.
    pub fn new(admins: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self { admins, clock }
    }
}

fn map_admin_repository_error(error: AdminRepositoryError) -> Error {
    match error {
        AdminRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("admin repository unavailable: {message}"))
        }
        AdminRepositoryError::Query { message } => {
            Error::internal(format!("admin repository error: {message}"))
        }
    }
}

/// Map a credential validation failure to a request error naming the field.
pub fn credential_validation_error(error: &CredentialValidationError) -> Error {
    let field = match error {
        CredentialValidationError::EmptyUsername => "username",
        CredentialValidationError::EmptyPassword
        | CredentialValidationError::PasswordTooShort { .. } => "password",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "fields": [field] }))
}

fn invalid_credentials() -> Error {
    Error::authentication_failed("invalid username or password")
}

impl<A: AdminRepository> AccessGateService<A> {
    async fn current_admin(&self) -> Result<Option<Admin>, Error> {
        self.admins.find().await.map_err(map_admin_repository_error)
    }

    fn sign_in(&self, username: String) -> SignedIn {
        SignedIn {
            grant: SessionGrant::issue(self.clock.utc()),
            username,
        }
    }
}

#[async_trait]
impl<A: AdminRepository> AccessGate for AccessGateService<A> {
    async fn check_status(&self, grant: Option<SessionGrant>) -> Result<AccessStatus, Error> {
        let Some(admin) = self.current_admin().await? else {
            return Ok(AccessStatus {
                authenticated: false,
                needs_setup: true,
                username: None,
            });
        };
        let now = self.clock.utc();
        let authenticated = grant.is_some_and(|grant| grant.is_valid_at(now));
        Ok(AccessStatus {
            authenticated,
            needs_setup: false,
            username: authenticated.then_some(admin.username),
        })
    }

    async fn setup(&self, username: &str, password: &str) -> Result<SignedIn, Error> {
        if self.current_admin().await?.is_some() {
            return Err(Error::conflict("operator account already exists"));
        }
        let credentials = LoginCredentials::try_from_parts(username, password)
            .map_err(|error| credential_validation_error(&error))?;
        let new_password = NewPassword::new(credentials.password())
            .map_err(|error| credential_validation_error(&error))?;
        let hash = PasswordHash::derive(&new_password, &mut rand::thread_rng());
        let admin = Admin::new(credentials.username(), hash, self.clock.utc());
        let inserted = self
            .admins
            .insert_if_absent(&admin)
            .await
            .map_err(map_admin_repository_error)?;
        if !inserted {
            return Err(Error::conflict("operator account already exists"));
        }
        info!(username = %admin.username, "operator account created");
        Ok(self.sign_in(admin.username))
    }

    async fn login(&self, username: &str, password: &str) -> Result<SignedIn, Error> {
        let Some(admin) = self.current_admin().await? else {
            return Err(Error::setup_required("operator account is not set up"));
        };
        let credentials = LoginCredentials::try_from_parts(username, password)
            .map_err(|error| credential_validation_error(&error))?;
        if admin.username != credentials.username()
            || !admin.password_hash.verify(credentials.password())
        {
            warn!(username = credentials.username(), "operator login rejected");
            return Err(invalid_credentials());
        }
        info!(username = %admin.username, "operator logged in");
        Ok(self.sign_in(admin.username))
    }

    async fn change_password(
        &self,
        operator: &Operator,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), Error> {
        let admin = self
            .current_admin()
            .await?
            .ok_or_else(|| Error::not_found("operator account not found"))?;
        if !admin.password_hash.verify(current_password) {
            warn!(username = operator.username(), "password change rejected");
            return Err(Error::authentication_failed("current password is incorrect"));
        }
        let new_password = NewPassword::new(new_password).map_err(|error| {
            Error::invalid_request(error.to_string())
                .with_details(json!({ "fields": ["newPassword"] }))
        })?;
        let hash = PasswordHash::derive(&new_password, &mut rand::thread_rng());
        self.admins
            .update_password(&admin.id, &hash, self.clock.utc())
            .await
            .map_err(map_admin_repository_error)?;
        info!(username = operator.username(), "operator password changed");
        Ok(())
    }

    async fn authorize(&self, grant: Option<SessionGrant>) -> Result<Operator, Error> {
        let now = self.clock.utc();
        let Some(_grant) = grant.filter(|grant| grant.is_valid_at(now)) else {
            return Err(Error::unauthorized("login required"));
        };
        let admin = self
            .current_admin()
            .await?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        Ok(Operator::new(admin.username))
    }
}

#[cfg(test)]
#[path = "access_gate_service_tests.rs"]
mod tests;
