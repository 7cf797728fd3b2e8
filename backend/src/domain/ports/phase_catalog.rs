//! Driving port for phase catalogue use-cases.
//!
//! Inbound adapters call this port to read and curate the catalogue. Reads
//! are public; every mutation requires the [`Operator`] capability.

use async_trait::async_trait;

use crate::domain::{Error, Operator, Phase, PhaseDraft, PhaseId, PhaseUpdate};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PhaseCatalog: Send + Sync {
    /// Phases in catalogue order.
    async fn list_phases(&self) -> Result<Vec<Phase>, Error>;

    /// Append a phase at the end of the catalogue.
    async fn create_phase(&self, operator: &Operator, draft: PhaseDraft) -> Result<Phase, Error>;

    async fn update_phase(
        &self,
        operator: &Operator,
        id: PhaseId,
        update: PhaseUpdate,
    ) -> Result<Phase, Error>;

    /// Remove a phase no transport currently sits in.
    async fn delete_phase(&self, operator: &Operator, id: PhaseId) -> Result<(), Error>;
}
