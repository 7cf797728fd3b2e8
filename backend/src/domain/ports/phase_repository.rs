//! Port for phase catalogue persistence.

use async_trait::async_trait;

use crate::domain::{Phase, PhaseId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by phase repository adapters.
    pub enum PhaseRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "phase repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "phase repository query failed: {message}",
        /// The phase is still referenced by a transport.
        InUse { phase_id: String } => "phase {phase_id} is still referenced",
    }
}

/// Port for the ordered phase catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhaseRepository: Send + Sync {
    /// All phases ascending by `order`, ties broken by creation time then id.
    async fn list(&self) -> Result<Vec<Phase>, PhaseRepositoryError>;

    async fn find_by_id(&self, id: &PhaseId) -> Result<Option<Phase>, PhaseRepositoryError>;

    /// The phase a new transport starts in by default.
    async fn first(&self) -> Result<Option<Phase>, PhaseRepositoryError>;

    async fn count(&self) -> Result<u64, PhaseRepositoryError>;

    async fn insert(&self, phase: &Phase) -> Result<(), PhaseRepositoryError>;

    /// Persist every mutable field of an existing phase.
    async fn update(&self, phase: &Phase) -> Result<(), PhaseRepositoryError>;

    /// Remove a phase, returning `false` when it did not exist.
    ///
    /// Adapters report [`PhaseRepositoryError::InUse`] when a transport still
    /// references the phase.
    async fn delete(&self, id: &PhaseId) -> Result<bool, PhaseRepositoryError>;

    /// Whether any transport currently sits in the phase.
    async fn is_current_for_any_transport(&self, id: &PhaseId)
    -> Result<bool, PhaseRepositoryError>;
}
