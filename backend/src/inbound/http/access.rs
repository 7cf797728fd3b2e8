//! Operator session HTTP handlers.
//!
//! ```text
//! GET  /api/v1/admin/session
//! POST /api/v1/admin/setup    {"username":"admin","password":"secret1"}
//! POST /api/v1/admin/login    {"username":"admin","password":"secret1"}
//! POST /api/v1/admin/logout
//! POST /api/v1/admin/password {"currentPassword":"secret1","newPassword":"secret2"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::SignedIn;
use crate::domain::AccessStatus;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_operator;
use crate::inbound::http::schemas::{AccessStatusSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Username and password for setup or login.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Body for `POST /api/v1/admin/password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

fn signed_in(session: &SessionContext, signed_in: SignedIn) -> ApiResult<web::Json<AccessStatus>> {
    session.persist_grant(&signed_in.grant)?;
    Ok(web::Json(AccessStatus {
        authenticated: true,
        needs_setup: false,
        username: Some(signed_in.username),
    }))
}

/// Report whether the caller is signed in and whether setup is pending.
#[utoipa::path(
    get,
    path = "/api/v1/admin/session",
    responses(
        (status = 200, description = "Session state", body = AccessStatusSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "getSession",
    security([])
)]
#[get("/admin/session")]
pub async fn session_status(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<AccessStatus>> {
    let status = state.access.check_status(session.grant()).await?;
    Ok(web::Json(status))
}

/// Create the operator account on a fresh deployment and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/admin/setup",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Operator created", body = AccessStatusSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid credentials payload", body = ErrorSchema),
        (status = 409, description = "Operator already exists", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "setupOperator",
    security([])
)]
#[post("/admin/setup")]
pub async fn setup(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<AccessStatus>> {
    let CredentialsRequest { username, password } = payload.into_inner();
    let outcome = state.access.setup(&username, &password).await?;
    signed_in(&session, outcome)
}

/// Authenticate the operator and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login success", body = AccessStatusSchema,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid credentials payload", body = ErrorSchema),
        (status = 401, description = "Wrong username or password", body = ErrorSchema),
        (status = 409, description = "Setup required", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "login",
    security([])
)]
#[post("/admin/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CredentialsRequest>,
) -> ApiResult<web::Json<AccessStatus>> {
    let CredentialsRequest { username, password } = payload.into_inner();
    let outcome = state.access.login(&username, &password).await?;
    signed_in(&session, outcome)
}

/// Clear the session. Always succeeds.
#[utoipa::path(
    post,
    path = "/api/v1/admin/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["admin"],
    operation_id = "logout",
    security([])
)]
#[post("/admin/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Replace the operator password after checking the current one.
#[utoipa::path(
    post,
    path = "/api/v1/admin/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "New password too short", body = ErrorSchema),
        (status = 401, description = "Not signed in or wrong current password", body = ErrorSchema),
        (status = 404, description = "No operator account", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "changePassword"
)]
#[post("/admin/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    let operator = require_operator(&state, &session).await?;
    let ChangePasswordRequest {
        current_password,
        new_password,
    } = payload.into_inner();
    state
        .access
        .change_password(&operator, &current_password, &new_password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
