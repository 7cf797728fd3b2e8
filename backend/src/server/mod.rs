//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use tracker_backend::Trace;
#[cfg(debug_assertions)]
use tracker_backend::doc::ApiDoc;
use tracker_backend::inbound::http::access::{
    change_password, login, logout, session_status, setup,
};
use tracker_backend::inbound::http::health::{HealthState, live, ready};
use tracker_backend::inbound::http::phases::{
    create_phase, delete_phase, list_phases, update_phase,
};
use tracker_backend::inbound::http::session_config::SessionSettings;
use tracker_backend::inbound::http::state::HttpState;
use tracker_backend::inbound::http::tracking::track;
use tracker_backend::inbound::http::transports::{
    create_transport, delete_transport, list_transports, update_transport,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(session.middleware())
        .service(session_status)
        .service(setup)
        .service(login)
        .service(logout)
        .service(change_password)
        .service(list_phases)
        .service(create_phase)
        .service(update_phase)
        .service(delete_phase)
        .service(list_transports)
        .service(create_transport)
        .service(update_transport)
        .service(delete_transport)
        .service(track);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when building adapters, binding the socket
/// or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(build_http_state(&config)?);
    let ServerConfig {
        session, bind_addr, ..
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
