//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccessGate, PhaseCatalog, TransportLifecycle};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub phases: Arc<dyn PhaseCatalog>,
    pub transports: Arc<dyn TransportLifecycle>,
    pub access: Arc<dyn AccessGate>,
}

impl HttpState {
    /// Bundle the driving ports shared by every handler.
    pub fn new(
        phases: Arc<dyn PhaseCatalog>,
        transports: Arc<dyn TransportLifecycle>,
        access: Arc<dyn AccessGate>,
    ) -> Self {
        Self {
            phases,
            transports,
            access,
        }
    }
}
