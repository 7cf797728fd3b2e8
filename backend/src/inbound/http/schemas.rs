//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic and do not derive `ToSchema`. The
//! wrappers here mirror their JSON shape for documentation only.

#![expect(
    dead_code,
    reason = "Schema wrappers exist only for OpenAPI generation via utoipa"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// A field is missing or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Username or password did not match.
    #[schema(rename = "authentication_failed")]
    AuthenticationFailed,
    /// No valid operator session.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "not_found")]
    NotFound,
    /// The request clashes with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// No operator account exists yet.
    #[schema(rename = "setup_required")]
    SetupRequired,
    /// The store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "missing required fields: customerEmail")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Field names or identifiers related to the failure.
    #[schema(value_type = Option<Object>)]
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Phase`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Phase)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "Priprema")]
    name: String,
    description: Option<String>,
    /// Position in the catalogue, starting at 1.
    #[schema(example = 1)]
    order: i32,
    #[schema(example = 2, minimum = 1, maximum = 3650)]
    default_days_to_complete: i32,
    #[schema(example = "#3b82f6")]
    color: String,
    #[schema(example = "clipboard")]
    icon_name: String,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::TransportStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::TransportStatus)]
#[serde(rename_all = "lowercase")]
pub enum TransportStatusSchema {
    Active,
    Completed,
    Cancelled,
}

/// OpenAPI schema for [`crate::domain::Transport`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Transport)]
#[serde(rename_all = "camelCase")]
pub struct TransportSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(example = "TR-LVQ3K2A1-7XZ9")]
    tracking_number: String,
    customer_name: String,
    #[schema(format = Email)]
    customer_email: String,
    #[schema(example = "Volkswagen")]
    vehicle_make: String,
    #[schema(example = "Golf")]
    vehicle_model: String,
    vehicle_year: Option<i32>,
    vehicle_vin: Option<String>,
    origin_location: String,
    destination_location: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    estimated_delivery: Option<String>,
    #[schema(value_type = String, format = Uuid)]
    current_phase_id: String,
    #[schema(value_type = String, format = DateTime)]
    phase_started_at: String,
    #[schema(minimum = 1, maximum = 3650)]
    days_to_complete_phase: i32,
    status: TransportStatusSchema,
    notes: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
    #[schema(value_type = String, format = DateTime)]
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::ports::TransportWithPhase`].
///
/// Transport fields flattened alongside the resolved current phase.
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::TransportWithPhase)]
#[serde(rename_all = "camelCase")]
pub struct TransportWithPhaseSchema {
    #[serde(flatten)]
    transport: TransportSchema,
    current_phase: Option<PhaseSchema>,
}

/// OpenAPI schema for [`crate::domain::PhaseHistoryEntry`].
#[derive(ToSchema)]
#[schema(as = crate::domain::PhaseHistoryEntry)]
#[serde(rename_all = "camelCase")]
pub struct PhaseHistoryEntrySchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    transport_id: String,
    #[schema(value_type = String, format = Uuid)]
    phase_id: String,
    phase_name: String,
    #[schema(value_type = String, format = DateTime)]
    changed_at: String,
    /// Whole days spent in the previous phase; absent on the first entry.
    days_in_phase: Option<i32>,
}

/// OpenAPI schema for [`crate::domain::Countdown`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Countdown)]
pub struct CountdownSchema {
    days: i64,
    hours: i64,
    minutes: i64,
    expired: bool,
}

/// OpenAPI schema for [`crate::domain::ports::TrackingView`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::TrackingView)]
#[serde(rename_all = "camelCase")]
pub struct TrackingViewSchema {
    transport: TransportSchema,
    current_phase: Option<PhaseSchema>,
    /// Newest first.
    history: Vec<PhaseHistoryEntrySchema>,
    countdown: CountdownSchema,
    phases: Vec<PhaseSchema>,
}

/// OpenAPI schema for [`crate::domain::AccessStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::AccessStatus)]
#[serde(rename_all = "camelCase")]
pub struct AccessStatusSchema {
    authenticated: bool,
    needs_setup: bool,
    username: Option<String>,
}
