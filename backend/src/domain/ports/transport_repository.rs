//! Port for transport and phase history persistence.
//!
//! Transports own their history: adapters write the history entry that
//! accompanies a creation or phase change in the same transaction as the
//! transport row, and delete history together with its transport.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{Phase, PhaseHistoryEntry, TrackingNumber, Transport, TransportId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by transport repository adapters.
    pub enum TransportRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "transport repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "transport repository query failed: {message}",
        /// Another transport already uses the tracking number.
        DuplicateTrackingNumber { tracking_number: String } =>
            "tracking number {tracking_number} already exists",
    }
}

/// A transport joined with its current phase.
///
/// `current_phase` is `None` only if the referenced phase row is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportWithPhase {
    #[serde(flatten)]
    pub transport: Transport,
    pub current_phase: Option<Phase>,
}

/// Port for transport storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransportRepository: Send + Sync {
    /// Insert a transport and its initial history entry atomically.
    ///
    /// Reports [`TransportRepositoryError::DuplicateTrackingNumber`] when the
    /// tracking number is taken.
    async fn create(
        &self,
        transport: &Transport,
        initial_entry: &PhaseHistoryEntry,
    ) -> Result<(), TransportRepositoryError>;

    async fn find_by_id(&self, id: &TransportId)
    -> Result<Option<Transport>, TransportRepositoryError>;

    async fn find_by_tracking_number(
        &self,
        tracking_number: &TrackingNumber,
    ) -> Result<Option<Transport>, TransportRepositoryError>;

    /// All transports with their current phase, newest first.
    async fn list_with_phase(&self) -> Result<Vec<TransportWithPhase>, TransportRepositoryError>;

    /// History of one transport, newest first.
    async fn history(
        &self,
        id: &TransportId,
    ) -> Result<Vec<PhaseHistoryEntry>, TransportRepositoryError>;

    /// Append a history entry and persist the updated transport atomically.
    async fn record_transition(
        &self,
        transport: &Transport,
        entry: &PhaseHistoryEntry,
    ) -> Result<(), TransportRepositoryError>;

    /// Persist field changes that do not touch history.
    async fn update(&self, transport: &Transport) -> Result<(), TransportRepositoryError>;

    /// Delete history then the transport atomically; `false` when absent.
    async fn delete(&self, id: &TransportId) -> Result<bool, TransportRepositoryError>;
}
