//! Driving port for the transport lifecycle.
//!
//! Tracking lookups are public. Everything else requires the [`Operator`]
//! capability minted by the access gate.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{
    Countdown, DayCount, Error, Operator, Phase, PhaseHistoryEntry, PhaseId, Transport,
    TransportDetailsInput, TransportId, TransportStatus,
};

use super::TransportWithPhase;

/// Input for creating a transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTransportRequest {
    pub details: TransportDetailsInput,
    /// Starting phase; the first catalogue phase when absent.
    pub phase_id: Option<PhaseId>,
    pub notes: Option<String>,
}

/// Composite update applied by the admin console.
///
/// Applied in order: phase change (with `days_to_complete_phase` as the
/// override) or, without a phase change, the days override; then status;
/// then notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportUpdateRequest {
    pub phase_id: Option<PhaseId>,
    pub days_to_complete_phase: Option<DayCount>,
    pub status: Option<TransportStatus>,
    /// `Some(None)` clears the notes.
    pub notes: Option<Option<String>>,
}

/// Everything a customer sees for one tracking number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingView {
    pub transport: Transport,
    pub current_phase: Option<Phase>,
    /// Newest first.
    pub history: Vec<PhaseHistoryEntry>,
    pub countdown: Countdown,
    /// Full catalogue in order, for timeline rendering.
    pub phases: Vec<Phase>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransportLifecycle: Send + Sync {
    async fn create_transport(
        &self,
        operator: &Operator,
        request: NewTransportRequest,
    ) -> Result<TransportWithPhase, Error>;

    /// Move a transport into `phase_id`; a no-op when already there.
    async fn advance_phase(
        &self,
        operator: &Operator,
        id: TransportId,
        phase_id: PhaseId,
        days_override: Option<DayCount>,
    ) -> Result<Transport, Error>;

    async fn set_status(
        &self,
        operator: &Operator,
        id: TransportId,
        status: TransportStatus,
    ) -> Result<Transport, Error>;

    async fn update_notes(
        &self,
        operator: &Operator,
        id: TransportId,
        notes: Option<String>,
    ) -> Result<Transport, Error>;

    async fn set_days_to_complete_phase(
        &self,
        operator: &Operator,
        id: TransportId,
        days: DayCount,
    ) -> Result<Transport, Error>;

    async fn update_transport(
        &self,
        operator: &Operator,
        id: TransportId,
        request: TransportUpdateRequest,
    ) -> Result<TransportWithPhase, Error>;

    async fn delete_transport(&self, operator: &Operator, id: TransportId) -> Result<(), Error>;

    async fn get_by_tracking_number(&self, tracking_number: &str) -> Result<TrackingView, Error>;

    /// All transports, newest first.
    async fn list_all(&self, operator: &Operator) -> Result<Vec<TransportWithPhase>, Error>;
}
