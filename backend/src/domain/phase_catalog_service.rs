//! Phase catalogue service implementing [`PhaseCatalog`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{PhaseCatalog, PhaseRepository, PhaseRepositoryError};
use crate::domain::{
    Error, Operator, Phase, PhaseDraft, PhaseId, PhaseUpdate, PhaseValidationError,
    default_catalogue,
};

/// Catalogue service over a [`PhaseRepository`].
pub struct PhaseCatalogService<P> {
    phases: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<P> Clone for PhaseCatalogService<P> {
    fn clone(&self) -> Self {
        Self {
            phases: Arc::clone(&self.phases),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<P> PhaseCatalogService<P> {
    /// Create a service backed by `phases`.
    pub fn new(phases: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self { phases, clock }
    }
}

pub(crate) fn map_phase_repository_error(error: PhaseRepositoryError) -> Error {
    match error {
        PhaseRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("phase repository unavailable: {message}"))
        }
        PhaseRepositoryError::Query { message } => {
            Error::internal(format!("phase repository error: {message}"))
        }
        PhaseRepositoryError::InUse { phase_id } => phase_in_use(&phase_id),
    }
}

/// Map a phase field validation failure to a request error naming the field.
pub fn phase_validation_error(error: &PhaseValidationError, field: &str) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({ "fields": [field] }))
}

fn phase_in_use(phase_id: &str) -> Error {
    Error::conflict("phase is the current phase of at least one transport")
        .with_details(json!({ "phaseId": phase_id }))
}

fn phase_not_found(id: PhaseId) -> Error {
    Error::not_found("phase not found").with_details(json!({ "phaseId": id.to_string() }))
}

impl<P: PhaseRepository> PhaseCatalogService<P> {
    /// Install the default catalogue when no phases exist.
    ///
    /// Returns the number of phases inserted.
    pub async fn seed_default_phases(&self) -> Result<usize, Error> {
        let existing = self
            .phases
            .count()
            .await
            .map_err(map_phase_repository_error)?;
        if existing > 0 {
            return Ok(0);
        }
        let now = self.clock.utc();
        let mut inserted = 0;
        for (order, draft) in (0_i32..).zip(default_catalogue()) {
            let phase = Phase::from_draft(draft, order, now);
            self.phases
                .insert(&phase)
                .await
                .map_err(map_phase_repository_error)?;
            inserted += 1;
        }
        info!(count = inserted, "seeded default phase catalogue");
        Ok(inserted)
    }
}

#[async_trait]
impl<P: PhaseRepository> PhaseCatalog for PhaseCatalogService<P> {
    async fn list_phases(&self) -> Result<Vec<Phase>, Error> {
        self.phases.list().await.map_err(map_phase_repository_error)
    }

    async fn create_phase(&self, operator: &Operator, draft: PhaseDraft) -> Result<Phase, Error> {
        let count = self
            .phases
            .count()
            .await
            .map_err(map_phase_repository_error)?;
        let order = i32::try_from(count)
            .map_err(|_| Error::conflict("phase catalogue is full"))?;
        let phase = Phase::from_draft(draft, order, self.clock.utc());
        self.phases
            .insert(&phase)
            .await
            .map_err(map_phase_repository_error)?;
        info!(
            phase_id = %phase.id,
            name = %phase.name,
            operator = operator.username(),
            "phase created"
        );
        Ok(phase)
    }

    async fn update_phase(
        &self,
        operator: &Operator,
        id: PhaseId,
        update: PhaseUpdate,
    ) -> Result<Phase, Error> {
        let existing = self
            .phases
            .find_by_id(&id)
            .await
            .map_err(map_phase_repository_error)?
            .ok_or_else(|| phase_not_found(id))?;
        let updated = existing.apply(update, self.clock.utc());
        self.phases
            .update(&updated)
            .await
            .map_err(map_phase_repository_error)?;
        info!(phase_id = %id, operator = operator.username(), "phase updated");
        Ok(updated)
    }

    async fn delete_phase(&self, operator: &Operator, id: PhaseId) -> Result<(), Error> {
        if self
            .phases
            .is_current_for_any_transport(&id)
            .await
            .map_err(map_phase_repository_error)?
        {
            return Err(phase_in_use(&id.to_string()));
        }
        let deleted = self
            .phases
            .delete(&id)
            .await
            .map_err(map_phase_repository_error)?;
        if !deleted {
            return Err(phase_not_found(id));
        }
        info!(phase_id = %id, operator = operator.username(), "phase deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "phase_catalog_service_tests.rs"]
mod tests;
