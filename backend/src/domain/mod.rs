//! Domain primitives, aggregates and services.
//!
//! Purpose: model the phase catalogue, the transport lifecycle, customer
//! notifications and operator access independently of HTTP and storage.
//! Adapters reach the domain only through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - Phase, Transport, PhaseHistoryEntry, Countdown: lifecycle data.
//! - PhaseCatalogService, TransportLifecycleService, AccessGateService:
//!   driving-port implementations.

pub mod access_gate_service;
pub mod admin;
pub mod auth;
pub mod countdown;
pub mod error;
pub mod notification;
pub mod phase;
pub mod phase_catalog_service;
pub mod phase_history;
pub mod ports;
pub mod trace_id;
pub mod transport;
pub mod transport_service;

pub use self::access_gate_service::AccessGateService;
pub use self::admin::{AccessStatus, Admin};
pub use self::auth::{
    CredentialValidationError, LoginCredentials, MIN_PASSWORD_CHARS, NewPassword, Operator,
    PasswordHash, SESSION_LIFETIME_HOURS, SessionGrant,
};
pub use self::countdown::Countdown;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::notification::{
    CREATION_PHASE_LABEL, EmailMessage, NotificationDispatcher, TransportNotice, render_notice,
};
pub use self::phase::{
    DEFAULT_PHASE_COLOR, DEFAULT_PHASE_DAYS, DEFAULT_PHASE_ICON, DayCount, MAX_PHASE_DAYS, Phase,
    PhaseDraft, PhaseId, PhaseUpdate, PhaseValidationError, default_catalogue, sort_catalogue,
};
pub use self::phase_catalog_service::PhaseCatalogService;
pub use self::phase_history::{PhaseHistoryEntry, days_in_phase};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::transport::{
    EmptyTrackingNumber, MissingTransportFields, PhaseTransition, TrackingNumber, Transport,
    TransportDetails, TransportDetailsInput, TransportId, TransportStatus, UnknownTransportStatus,
};
pub use self::transport_service::TransportLifecycleService;

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use tracker_backend::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<()> {
///     Err(Error::not_found("transport not found"))
/// }
/// ```
pub type DomainResult<T> = Result<T, Error>;
