//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod access_gate;
mod admin_repository;
mod notifier;
mod phase_catalog;
mod phase_repository;
mod transport_lifecycle;
mod transport_repository;

pub use access_gate::{AccessGate, SignedIn};
#[cfg(test)]
pub use access_gate::MockAccessGate;
pub use admin_repository::{AdminRepository, AdminRepositoryError};
#[cfg(test)]
pub use admin_repository::MockAdminRepository;
pub use notifier::{LogOnlyNotifier, Notifier, NotifierError};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use phase_catalog::PhaseCatalog;
#[cfg(test)]
pub use phase_catalog::MockPhaseCatalog;
pub use phase_repository::{PhaseRepository, PhaseRepositoryError};
#[cfg(test)]
pub use phase_repository::MockPhaseRepository;
pub use transport_lifecycle::{
    NewTransportRequest, TrackingView, TransportLifecycle, TransportUpdateRequest,
};
#[cfg(test)]
pub use transport_lifecycle::MockTransportLifecycle;
pub use transport_repository::{
    TransportRepository, TransportRepositoryError, TransportWithPhase,
};
#[cfg(test)]
pub use transport_repository::MockTransportRepository;
