//! Tests for phase catalogue HTTP handlers.

use super::*;
use crate::domain::ports::{MockAccessGate, MockPhaseCatalog, MockTransportLifecycle};
use crate::domain::{DayCount, Error, PhaseId};
use crate::inbound::http::test_utils::{fixed_now, signed_in_gate, signed_out_gate, state_with, test_session_middleware};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

fn test_app(
    phases: MockPhaseCatalog,
    access: MockAccessGate,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = state_with(phases, MockTransportLifecycle::new(), access);
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(list_phases)
                .service(create_phase)
                .service(update_phase)
                .service(delete_phase),
        )
}

#[fixture]
fn priprema() -> Phase {
    let draft = PhaseDraft::new("Priprema")
        .expect("valid name")
        .with_default_days(DayCount::new(2).expect("positive"));
    Phase::from_draft(draft, 1, fixed_now())
}

#[rstest]
#[actix_web::test]
async fn listing_is_public(priprema: Phase) {
    let mut phases = MockPhaseCatalog::new();
    let listed = vec![priprema.clone()];
    phases
        .expect_list_phases()
        .times(1)
        .return_once(move || Ok(listed));
    let app = actix_test::init_service(test_app(phases, MockAccessGate::new())).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/phases").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body[0]["name"], "Priprema");
    assert_eq!(body[0]["defaultDaysToComplete"], 2);
    assert_eq!(body[0]["id"], priprema.id.to_string());
}

#[actix_web::test]
async fn creating_without_session_is_unauthorised() {
    let mut phases = MockPhaseCatalog::new();
    phases.expect_create_phase().never();
    let app = actix_test::init_service(test_app(phases, signed_out_gate())).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/phases")
            .set_json(json!({ "name": "Carina" }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
}

#[rstest]
#[actix_web::test]
async fn create_passes_a_draft_and_returns_created(priprema: Phase) {
    let mut phases = MockPhaseCatalog::new();
    let created = priprema.clone();
    phases
        .expect_create_phase()
        .withf(|_, draft| draft.name() == "Priprema")
        .times(1)
        .return_once(move |_, _| Ok(created));
    let app = actix_test::init_service(test_app(phases, signed_in_gate())).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/phases")
            .set_json(json!({ "name": "  Priprema ", "defaultDaysToComplete": 2 }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
}

#[rstest]
#[case(json!({ "name": "" }), "name")]
#[case(json!({ "name": "Carina", "defaultDaysToComplete": 0 }), "defaultDaysToComplete")]
#[actix_web::test]
async fn create_rejects_invalid_fields(#[case] payload: Value, #[case] field: &str) {
    let mut phases = MockPhaseCatalog::new();
    phases.expect_create_phase().never();
    let app = actix_test::init_service(test_app(phases, signed_in_gate())).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/phases")
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["fields"], json!([field]));
}

#[rstest]
#[actix_web::test]
async fn update_targets_the_path_id(priprema: Phase) {
    let id = priprema.id;
    let mut phases = MockPhaseCatalog::new();
    let updated = Phase {
        order: 3,
        ..priprema
    };
    phases
        .expect_update_phase()
        .withf(move |_, candidate, update| {
            *candidate == id && *update == PhaseUpdate::default().order(3)
        })
        .times(1)
        .return_once(move |_, _, _| Ok(updated));
    let app = actix_test::init_service(test_app(phases, signed_in_gate())).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/phases/{id}"))
            .set_json(json!({ "order": 3 }))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["order"], 3);
}

#[actix_web::test]
async fn malformed_phase_id_is_rejected() {
    let mut phases = MockPhaseCatalog::new();
    phases.expect_delete_phase().never();
    let app = actix_test::init_service(test_app(phases, signed_in_gate())).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri("/api/v1/phases/not-a-uuid")
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn deleting_a_phase_in_use_conflicts() {
    let id = PhaseId::random();
    let mut phases = MockPhaseCatalog::new();
    phases
        .expect_delete_phase()
        .withf(move |_, candidate| *candidate == id)
        .times(1)
        .return_once(|_, _| {
            Err(Error::conflict(
                "phase is the current phase of at least one transport",
            ))
        });
    let app = actix_test::init_service(test_app(phases, signed_in_gate())).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/phases/{id}"))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn deleting_an_idle_phase_returns_no_content() {
    let mut phases = MockPhaseCatalog::new();
    phases
        .expect_delete_phase()
        .times(1)
        .return_once(|_, _| Ok(()));
    let app = actix_test::init_service(test_app(phases, signed_in_gate())).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/phases/{}", PhaseId::random()))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}
