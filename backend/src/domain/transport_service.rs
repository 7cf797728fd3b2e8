//! Transport lifecycle service implementing [`TransportLifecycle`].
//!
//! The service owns the lifecycle rules: phase changes append history and
//! restart the phase clock, completion triggers a customer notice, and every
//! notice is sent only after the mutation has been persisted.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::phase_catalog_service::map_phase_repository_error;
use crate::domain::ports::{
    NewTransportRequest, Notifier, PhaseRepository, TrackingView, TransportLifecycle,
    TransportRepository, TransportRepositoryError, TransportUpdateRequest, TransportWithPhase,
};
use crate::domain::{
    Countdown, DayCount, Error, NotificationDispatcher, Operator, Phase, PhaseId,
    TrackingNumber, Transport, TransportDetails, TransportId, TransportNotice, TransportStatus,
};

/// Attempts at generating an unused tracking number before giving up.
pub const TRACKING_NUMBER_ATTEMPTS: usize = 5;

/// Lifecycle engine over phase and transport repositories.
pub struct TransportLifecycleService<P, T, N> {
    phases: Arc<P>,
    transports: Arc<T>,
    dispatcher: NotificationDispatcher<N>,
    clock: Arc<dyn Clock>,
}

impl<P, T, N> Clone for TransportLifecycleService<P, T, N> {
    fn clone(&self) -> Self {
        Self {
            phases: Arc::clone(&self.phases),
            transports: Arc::clone(&self.transports),
            dispatcher: self.dispatcher.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<P, T, N> TransportLifecycleService<P, T, N> {
    /// Create a lifecycle service.
    pub fn new(
        phases: Arc<P>,
        transports: Arc<T>,
        dispatcher: NotificationDispatcher<N>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            phases,
            transports,
            dispatcher,
            clock,
        }
    }
}

fn map_transport_repository_error(error: TransportRepositoryError) -> Error {
    match error {
        TransportRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("transport repository unavailable: {message}"))
        }
        TransportRepositoryError::Query { message } => {
            Error::internal(format!("transport repository error: {message}"))
        }
        TransportRepositoryError::DuplicateTrackingNumber { tracking_number } => {
            Error::conflict("tracking number already exists")
                .with_details(json!({ "trackingNumber": tracking_number }))
        }
    }
}

fn transport_not_found(id: TransportId) -> Error {
    Error::not_found("transport not found").with_details(json!({ "transportId": id.to_string() }))
}

fn phase_not_found(id: PhaseId) -> Error {
    Error::not_found("phase not found").with_details(json!({ "phaseId": id.to_string() }))
}

impl<P, T, N> TransportLifecycleService<P, T, N>
where
    P: PhaseRepository,
    T: TransportRepository,
    N: Notifier,
{
    async fn load_transport(&self, id: TransportId) -> Result<Transport, Error> {
        self.transports
            .find_by_id(&id)
            .await
            .map_err(map_transport_repository_error)?
            .ok_or_else(|| transport_not_found(id))
    }

    async fn load_phase(&self, id: PhaseId) -> Result<Option<Phase>, Error> {
        self.phases
            .find_by_id(&id)
            .await
            .map_err(map_phase_repository_error)
    }

    async fn initial_phase(&self, requested: Option<PhaseId>) -> Result<Phase, Error> {
        match requested {
            Some(id) => self.load_phase(id).await?.ok_or_else(|| {
                Error::invalid_request("phase not found")
                    .with_details(json!({ "fields": ["phaseId"] }))
            }),
            None => self
                .phases
                .first()
                .await
                .map_err(map_phase_repository_error)?
                .ok_or_else(|| Error::invalid_request("no phases defined")),
        }
    }

    async fn persist_new(
        &self,
        details: TransportDetails,
        phase: &Phase,
        notes: Option<String>,
    ) -> Result<Transport, Error> {
        let mut last_error = None;
        for attempt in 1..=TRACKING_NUMBER_ATTEMPTS {
            let now = self.clock.utc();
            let tracking_number = TrackingNumber::generate(now, &mut rand::thread_rng());
            let transition =
                Transport::begin(details.clone(), tracking_number, phase, notes.clone(), now);
            match self
                .transports
                .create(&transition.transport, &transition.entry)
                .await
            {
                Ok(()) => return Ok(transition.transport),
                Err(error @ TransportRepositoryError::DuplicateTrackingNumber { .. }) => {
                    warn!(attempt, %error, "tracking number collision; regenerating");
                    last_error = Some(error);
                }
                Err(error) => return Err(map_transport_repository_error(error)),
            }
        }
        Err(last_error.map_or_else(
            || Error::internal("tracking number generation failed"),
            map_transport_repository_error,
        ))
    }

    /// Apply a phase change and report the old phase name for the notice.
    async fn transition(
        &self,
        transport: Transport,
        phase: &Phase,
        days_override: Option<DayCount>,
    ) -> Result<Transport, Error> {
        let now = self.clock.utc();
        let Some(transition) = transport.advance_to(phase, days_override, now) else {
            return Ok(transport);
        };
        let previous_phase = self
            .load_phase(transport.current_phase_id)
            .await?
            .map_or_else(|| transition_label_for_missing(&transport), |p| p.name);
        self.transports
            .record_transition(&transition.transport, &transition.entry)
            .await
            .map_err(map_transport_repository_error)?;
        info!(
            transport_id = %transition.transport.id,
            from = %previous_phase,
            to = %phase.name,
            days_in_phase = transition.entry.days_in_phase,
            "transport advanced"
        );
        let notice = TransportNotice::PhaseChange {
            previous_phase,
            new_phase: phase.name.clone(),
            days_to_complete: transition.transport.days_to_complete_phase,
        };
        self.dispatcher.notify(&transition.transport, &notice).await;
        Ok(transition.transport)
    }

    async fn apply_status(
        &self,
        transport: Transport,
        status: TransportStatus,
    ) -> Result<Transport, Error> {
        let updated = transport.with_status(status, self.clock.utc());
        self.transports
            .update(&updated)
            .await
            .map_err(map_transport_repository_error)?;
        info!(transport_id = %updated.id, %status, "transport status set");
        if status == TransportStatus::Completed {
            self.dispatcher
                .notify(&updated, &TransportNotice::Completion)
                .await;
        }
        Ok(updated)
    }

    async fn save(&self, transport: Transport) -> Result<Transport, Error> {
        self.transports
            .update(&transport)
            .await
            .map_err(map_transport_repository_error)?;
        Ok(transport)
    }

    async fn with_phase(&self, transport: Transport) -> Result<TransportWithPhase, Error> {
        let current_phase = self.load_phase(transport.current_phase_id).await?;
        Ok(TransportWithPhase {
            transport,
            current_phase,
        })
    }
}

/// Label used when the previous phase row no longer exists.
fn transition_label_for_missing(transport: &Transport) -> String {
    transport.current_phase_id.to_string()
}

fn normalise_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[async_trait]
impl<P, T, N> TransportLifecycle for TransportLifecycleService<P, T, N>
where
    P: PhaseRepository,
    T: TransportRepository,
    N: Notifier,
{
    async fn create_transport(
        &self,
        operator: &Operator,
        request: NewTransportRequest,
    ) -> Result<TransportWithPhase, Error> {
        let NewTransportRequest {
            details,
            phase_id,
            notes,
        } = request;
        let details = TransportDetails::try_from(details).map_err(|missing| {
            Error::invalid_request(missing.to_string())
                .with_details(json!({ "fields": missing.fields }))
        })?;
        let phase = self.initial_phase(phase_id).await?;
        let transport = self
            .persist_new(details, &phase, normalise_notes(notes))
            .await?;
        info!(
            transport_id = %transport.id,
            tracking_number = %transport.tracking_number,
            phase = %phase.name,
            operator = operator.username(),
            "transport created"
        );
        let notice = TransportNotice::started(phase.name.clone(), transport.days_to_complete_phase);
        self.dispatcher.notify(&transport, &notice).await;
        Ok(TransportWithPhase {
            transport,
            current_phase: Some(phase),
        })
    }

    async fn advance_phase(
        &self,
        _operator: &Operator,
        id: TransportId,
        phase_id: PhaseId,
        days_override: Option<DayCount>,
    ) -> Result<Transport, Error> {
        let transport = self.load_transport(id).await?;
        let phase = self
            .load_phase(phase_id)
            .await?
            .ok_or_else(|| phase_not_found(phase_id))?;
        self.transition(transport, &phase, days_override).await
    }

    async fn set_status(
        &self,
        _operator: &Operator,
        id: TransportId,
        status: TransportStatus,
    ) -> Result<Transport, Error> {
        let transport = self.load_transport(id).await?;
        self.apply_status(transport, status).await
    }

    async fn update_notes(
        &self,
        _operator: &Operator,
        id: TransportId,
        notes: Option<String>,
    ) -> Result<Transport, Error> {
        let transport = self.load_transport(id).await?;
        self.save(transport.with_notes(normalise_notes(notes), self.clock.utc()))
            .await
    }

    async fn set_days_to_complete_phase(
        &self,
        _operator: &Operator,
        id: TransportId,
        days: DayCount,
    ) -> Result<Transport, Error> {
        let transport = self.load_transport(id).await?;
        self.save(transport.with_days_to_complete_phase(days, self.clock.utc()))
            .await
    }

    async fn update_transport(
        &self,
        _operator: &Operator,
        id: TransportId,
        request: TransportUpdateRequest,
    ) -> Result<TransportWithPhase, Error> {
        let TransportUpdateRequest {
            phase_id,
            days_to_complete_phase,
            status,
            notes,
        } = request;
        let mut transport = self.load_transport(id).await?;

        match phase_id.filter(|phase_id| *phase_id != transport.current_phase_id) {
            Some(phase_id) => {
                let phase = self
                    .load_phase(phase_id)
                    .await?
                    .ok_or_else(|| phase_not_found(phase_id))?;
                transport = self
                    .transition(transport, &phase, days_to_complete_phase)
                    .await?;
            }
            None => {
                if let Some(days) = days_to_complete_phase {
                    transport = self
                        .save(transport.with_days_to_complete_phase(days, self.clock.utc()))
                        .await?;
                }
            }
        }
        if let Some(status) = status {
            transport = self.apply_status(transport, status).await?;
        }
        if let Some(notes) = notes {
            transport = self
                .save(transport.with_notes(normalise_notes(notes), self.clock.utc()))
                .await?;
        }
        self.with_phase(transport).await
    }

    async fn delete_transport(&self, operator: &Operator, id: TransportId) -> Result<(), Error> {
        let deleted = self
            .transports
            .delete(&id)
            .await
            .map_err(map_transport_repository_error)?;
        if !deleted {
            return Err(transport_not_found(id));
        }
        info!(transport_id = %id, operator = operator.username(), "transport deleted");
        Ok(())
    }

    async fn get_by_tracking_number(&self, tracking_number: &str) -> Result<TrackingView, Error> {
        let tracking_number = TrackingNumber::new(tracking_number).map_err(|error| {
            Error::invalid_request(error.to_string())
                .with_details(json!({ "fields": ["trackingNumber"] }))
        })?;
        let transport = self
            .transports
            .find_by_tracking_number(&tracking_number)
            .await
            .map_err(map_transport_repository_error)?
            .ok_or_else(|| {
                Error::not_found("transport not found")
                    .with_details(json!({ "trackingNumber": tracking_number.as_str() }))
            })?;
        let history = self
            .transports
            .history(&transport.id)
            .await
            .map_err(map_transport_repository_error)?;
        let phases = self.phases.list().await.map_err(map_phase_repository_error)?;
        let current_phase = phases
            .iter()
            .find(|phase| phase.id == transport.current_phase_id)
            .cloned();
        let countdown = Countdown::remaining(
            transport.phase_started_at,
            transport.days_to_complete_phase,
            self.clock.utc(),
        );
        Ok(TrackingView {
            transport,
            current_phase,
            history,
            countdown,
            phases,
        })
    }

    async fn list_all(&self, _operator: &Operator) -> Result<Vec<TransportWithPhase>, Error> {
        self.transports
            .list_with_phase()
            .await
            .map_err(map_transport_repository_error)
    }
}

#[cfg(test)]
#[path = "transport_service_tests.rs"]
mod tests;
