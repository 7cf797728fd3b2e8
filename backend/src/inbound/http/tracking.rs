//! Public tracking lookup.
//!
//! ```text
//! GET /api/v1/track/TR-LVN9XK00-QW12
//! ```

use actix_web::{HttpResponse, get, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, TrackingViewSchema};
use crate::inbound::http::state::HttpState;

/// Everything a customer sees for one tracking number.
///
/// Responses are never cached so the countdown stays current.
#[utoipa::path(
    get,
    path = "/api/v1/track/{tracking_number}",
    params(("tracking_number" = String, Path, description = "Public tracking number")),
    responses(
        (status = 200, description = "Tracking view", body = TrackingViewSchema,
            headers(("Cache-Control" = String, description = "Always no-store"))),
        (status = 404, description = "Unknown tracking number", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["tracking"],
    operation_id = "trackTransport",
    security([])
)]
#[get("/track/{tracking_number}")]
pub async fn track(state: web::Data<HttpState>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let view = state
        .transports
        .get_by_tracking_number(&path.into_inner())
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "no-store"))
        .json(view))
}
