//! Phase catalogue HTTP handlers.
//!
//! ```text
//! GET    /api/v1/phases
//! POST   /api/v1/phases      {"name":"Carina","defaultDaysToComplete":2}
//! PUT    /api/v1/phases/{id} {"order":3}
//! DELETE /api/v1/phases/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Phase, PhaseDraft, PhaseUpdate};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_operator;
use crate::inbound::http::schemas::{ErrorSchema, PhaseSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{map_phase_field, non_blank, parse_day_count, parse_phase_id};

/// Body for `POST /api/v1/phases`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePhaseRequest {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub default_days_to_complete: Option<i64>,
    pub color: Option<String>,
    pub icon_name: Option<String>,
}

/// Body for `PUT /api/v1/phases/{id}`. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhaseRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub default_days_to_complete: Option<i64>,
    pub color: Option<String>,
    pub icon_name: Option<String>,
    pub order: Option<i32>,
}

fn parse_draft(payload: CreatePhaseRequest) -> ApiResult<PhaseDraft> {
    let mut draft = PhaseDraft::new(&payload.name)
        .map_err(map_phase_field("name"))?
        .with_description(non_blank(payload.description));
    if let Some(days) = payload.default_days_to_complete {
        draft = draft.with_default_days(parse_day_count(days, "defaultDaysToComplete")?);
    }
    if let Some(color) = non_blank(payload.color) {
        draft = draft.with_color(color);
    }
    if let Some(icon_name) = non_blank(payload.icon_name) {
        draft = draft.with_icon_name(icon_name);
    }
    Ok(draft)
}

fn parse_update(payload: UpdatePhaseRequest) -> ApiResult<PhaseUpdate> {
    let mut update = PhaseUpdate::default();
    if let Some(name) = payload.name {
        update = update.name(&name).map_err(map_phase_field("name"))?;
    }
    if let Some(description) = payload.description {
        update = update.description(description);
    }
    if let Some(days) = payload.default_days_to_complete {
        update = update.default_days(parse_day_count(days, "defaultDaysToComplete")?);
    }
    if let Some(color) = non_blank(payload.color) {
        update = update.color(color);
    }
    if let Some(icon_name) = non_blank(payload.icon_name) {
        update = update.icon_name(icon_name);
    }
    if let Some(order) = payload.order {
        update = update.order(order);
    }
    Ok(update)
}

/// List the catalogue in display order.
#[utoipa::path(
    get,
    path = "/api/v1/phases",
    responses(
        (status = 200, description = "Phases in catalogue order", body = [PhaseSchema]),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["phases"],
    operation_id = "listPhases",
    security([])
)]
#[get("/phases")]
pub async fn list_phases(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Phase>>> {
    let phases = state.phases.list_phases().await?;
    Ok(web::Json(phases))
}

/// Append a phase to the end of the catalogue.
#[utoipa::path(
    post,
    path = "/api/v1/phases",
    request_body = CreatePhaseRequest,
    responses(
        (status = 201, description = "Phase created", body = PhaseSchema),
        (status = 400, description = "Invalid phase", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["phases"],
    operation_id = "createPhase"
)]
#[post("/phases")]
pub async fn create_phase(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreatePhaseRequest>,
) -> ApiResult<HttpResponse> {
    let operator = require_operator(&state, &session).await?;
    let draft = parse_draft(payload.into_inner())?;
    let phase = state.phases.create_phase(&operator, draft).await?;
    Ok(HttpResponse::Created().json(phase))
}

/// Edit a phase in place.
#[utoipa::path(
    put,
    path = "/api/v1/phases/{id}",
    params(("id" = String, Path, description = "Phase identifier")),
    request_body = UpdatePhaseRequest,
    responses(
        (status = 200, description = "Updated phase", body = PhaseSchema),
        (status = 400, description = "Invalid phase fields", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown phase", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["phases"],
    operation_id = "updatePhase"
)]
#[put("/phases/{id}")]
pub async fn update_phase(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdatePhaseRequest>,
) -> ApiResult<web::Json<Phase>> {
    let operator = require_operator(&state, &session).await?;
    let id = parse_phase_id(&path.into_inner(), "id")?;
    let update = parse_update(payload.into_inner())?;
    let phase = state.phases.update_phase(&operator, id, update).await?;
    Ok(web::Json(phase))
}

/// Remove a phase that no transport currently sits in.
#[utoipa::path(
    delete,
    path = "/api/v1/phases/{id}",
    params(("id" = String, Path, description = "Phase identifier")),
    responses(
        (status = 204, description = "Phase deleted"),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown phase", body = ErrorSchema),
        (status = 409, description = "Phase in use", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["phases"],
    operation_id = "deletePhase"
)]
#[delete("/phases/{id}")]
pub async fn delete_phase(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let operator = require_operator(&state, &session).await?;
    let id = parse_phase_id(&path.into_inner(), "id")?;
    state.phases.delete_phase(&operator, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "phases_tests.rs"]
mod tests;
