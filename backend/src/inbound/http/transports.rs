//! Transport HTTP handlers for the admin console.
//!
//! ```text
//! GET    /api/v1/transports
//! POST   /api/v1/transports      {"customerName":"…","phaseId":"…",…}
//! PUT    /api/v1/transports/{id} {"phaseId":"…","status":"completed"}
//! DELETE /api/v1/transports/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::TransportDetailsInput;
use crate::domain::ports::{NewTransportRequest, TransportUpdateRequest, TransportWithPhase};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_operator;
use crate::inbound::http::schemas::{ErrorSchema, TransportWithPhaseSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    non_blank, parse_day_count, parse_phase_id, parse_status, parse_timestamp, parse_transport_id,
};

/// Body for `POST /api/v1/transports`.
///
/// Missing required strings are reported together as `details.fields`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTransportRequest {
    pub customer_name: String,
    #[schema(format = Email)]
    pub customer_email: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_year: Option<i32>,
    pub vehicle_vin: Option<String>,
    pub origin_location: String,
    pub destination_location: String,
    /// RFC 3339 instant or `YYYY-MM-DD`.
    pub estimated_delivery: Option<String>,
    /// Starting phase; the first catalogue phase when absent.
    pub phase_id: Option<String>,
    pub notes: Option<String>,
}

/// Body for `PUT /api/v1/transports/{id}`. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTransportRequest {
    pub phase_id: Option<String>,
    #[schema(minimum = 1, maximum = 3650)]
    pub days_to_complete_phase: Option<i64>,
    #[schema(example = "completed")]
    pub status: Option<String>,
    /// An empty string clears the notes.
    pub notes: Option<String>,
}

fn parse_new_transport(payload: CreateTransportRequest) -> ApiResult<NewTransportRequest> {
    let estimated_delivery = non_blank(payload.estimated_delivery)
        .map(|raw| parse_timestamp(&raw, "estimatedDelivery"))
        .transpose()?;
    let phase_id = non_blank(payload.phase_id)
        .map(|raw| parse_phase_id(&raw, "phaseId"))
        .transpose()?;
    Ok(NewTransportRequest {
        details: TransportDetailsInput {
            customer_name: payload.customer_name,
            customer_email: payload.customer_email,
            vehicle_make: payload.vehicle_make,
            vehicle_model: payload.vehicle_model,
            vehicle_year: payload.vehicle_year,
            vehicle_vin: non_blank(payload.vehicle_vin),
            origin_location: payload.origin_location,
            destination_location: payload.destination_location,
            estimated_delivery,
        },
        phase_id,
        notes: payload.notes,
    })
}

fn parse_transport_update(payload: UpdateTransportRequest) -> ApiResult<TransportUpdateRequest> {
    Ok(TransportUpdateRequest {
        phase_id: non_blank(payload.phase_id)
            .map(|raw| parse_phase_id(&raw, "phaseId"))
            .transpose()?,
        days_to_complete_phase: payload
            .days_to_complete_phase
            .map(|days| parse_day_count(days, "daysToCompletePhase"))
            .transpose()?,
        status: non_blank(payload.status)
            .map(|raw| parse_status(&raw))
            .transpose()?,
        notes: payload.notes.map(Some),
    })
}

/// List every transport with its current phase, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/transports",
    responses(
        (status = 200, description = "Transports", body = [TransportWithPhaseSchema]),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["transports"],
    operation_id = "listTransports"
)]
#[get("/transports")]
pub async fn list_transports(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<TransportWithPhase>>> {
    let operator = require_operator(&state, &session).await?;
    let transports = state.transports.list_all(&operator).await?;
    Ok(web::Json(transports))
}

/// Register a transport and notify the customer.
#[utoipa::path(
    post,
    path = "/api/v1/transports",
    request_body = CreateTransportRequest,
    responses(
        (status = 201, description = "Transport created", body = TransportWithPhaseSchema),
        (status = 400, description = "Missing fields or unknown phase", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 409, description = "Tracking number collision", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["transports"],
    operation_id = "createTransport"
)]
#[post("/transports")]
pub async fn create_transport(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateTransportRequest>,
) -> ApiResult<HttpResponse> {
    let operator = require_operator(&state, &session).await?;
    let request = parse_new_transport(payload.into_inner())?;
    let created = state.transports.create_transport(&operator, request).await?;
    Ok(HttpResponse::Created().json(created))
}

/// Apply a phase change, days override, status, or notes edit.
#[utoipa::path(
    put,
    path = "/api/v1/transports/{id}",
    params(("id" = String, Path, description = "Transport identifier")),
    request_body = UpdateTransportRequest,
    responses(
        (status = 200, description = "Updated transport", body = TransportWithPhaseSchema),
        (status = 400, description = "Invalid update", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown transport or phase", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["transports"],
    operation_id = "updateTransport"
)]
#[put("/transports/{id}")]
pub async fn update_transport(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateTransportRequest>,
) -> ApiResult<web::Json<TransportWithPhase>> {
    let operator = require_operator(&state, &session).await?;
    let id = parse_transport_id(&path.into_inner())?;
    let request = parse_transport_update(payload.into_inner())?;
    let updated = state
        .transports
        .update_transport(&operator, id, request)
        .await?;
    Ok(web::Json(updated))
}

/// Delete a transport together with its history.
#[utoipa::path(
    delete,
    path = "/api/v1/transports/{id}",
    params(("id" = String, Path, description = "Transport identifier")),
    responses(
        (status = 204, description = "Transport deleted"),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown transport", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["transports"],
    operation_id = "deleteTransport"
)]
#[delete("/transports/{id}")]
pub async fn delete_transport(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let operator = require_operator(&state, &session).await?;
    let id = parse_transport_id(&path.into_inner())?;
    state.transports.delete_transport(&operator, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "transports_tests.rs"]
mod tests;
