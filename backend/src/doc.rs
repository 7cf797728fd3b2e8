//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint, the schema wrappers from
//! [`crate::inbound::http::schemas`], and the session cookie security
//! scheme. Swagger UI serves it in debug builds and `openapi-dump` prints it.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::access::{ChangePasswordRequest, CredentialsRequest};
use crate::inbound::http::health::HealthStatus;
use crate::inbound::http::phases::{CreatePhaseRequest, UpdatePhaseRequest};
use crate::inbound::http::schemas::{
    AccessStatusSchema, CountdownSchema, ErrorCodeSchema, ErrorSchema, PhaseHistoryEntrySchema,
    PhaseSchema, TrackingViewSchema, TransportSchema, TransportStatusSchema,
    TransportWithPhaseSchema,
};
use crate::inbound::http::transports::{CreateTransportRequest, UpdateTransportRequest};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "tracker_session",
                "Operator session cookie issued by POST /api/v1/admin/login or /admin/setup.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Transport tracker API",
        description = "Public tracking lookup plus the operator console for phases and transports."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::access::session_status,
        crate::inbound::http::access::setup,
        crate::inbound::http::access::login,
        crate::inbound::http::access::logout,
        crate::inbound::http::access::change_password,
        crate::inbound::http::phases::list_phases,
        crate::inbound::http::phases::create_phase,
        crate::inbound::http::phases::update_phase,
        crate::inbound::http::phases::delete_phase,
        crate::inbound::http::tracking::track,
        crate::inbound::http::transports::list_transports,
        crate::inbound::http::transports::create_transport,
        crate::inbound::http::transports::update_transport,
        crate::inbound::http::transports::delete_transport,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        PhaseSchema,
        TransportSchema,
        TransportStatusSchema,
        TransportWithPhaseSchema,
        PhaseHistoryEntrySchema,
        CountdownSchema,
        TrackingViewSchema,
        AccessStatusSchema,
        CredentialsRequest,
        ChangePasswordRequest,
        CreatePhaseRequest,
        UpdatePhaseRequest,
        CreateTransportRequest,
        UpdateTransportRequest,
        HealthStatus,
    )),
    tags(
        (name = "admin", description = "Operator setup, login and password management"),
        (name = "phases", description = "Phase catalogue"),
        (name = "transports", description = "Transport lifecycle for the operator console"),
        (name = "tracking", description = "Public tracking lookup"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
