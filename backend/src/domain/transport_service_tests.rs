//! Tests for the transport lifecycle service.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockNotifier, MockPhaseRepository, MockTransportRepository, NotifierError, PhaseRepository,
};
use crate::domain::{ErrorCode, PhaseDraft, PhaseHistoryEntry, TransportDetailsInput};
use crate::test_support::{InMemoryStore, MutableClock, RecordingNotifier};

type Service = TransportLifecycleService<MockPhaseRepository, MockTransportRepository, MockNotifier>;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
        .single()
        .expect("valid instant")
}

#[fixture]
fn operator() -> Operator {
    Operator::new("admin")
}

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::new(start()))
}

fn phase(name: &str, days: i64, order: i32) -> Phase {
    let draft = PhaseDraft::new(name)
        .expect("valid draft")
        .with_default_days(DayCount::new(days).expect("positive"));
    Phase::from_draft(draft, order, start())
}

fn details_input() -> TransportDetailsInput {
    TransportDetailsInput {
        customer_name: "Petar Petrović".to_owned(),
        customer_email: "petar@example.com".to_owned(),
        vehicle_make: "Škoda".to_owned(),
        vehicle_model: "Octavia".to_owned(),
        origin_location: "Beč".to_owned(),
        destination_location: "Kragujevac".to_owned(),
        ..TransportDetailsInput::default()
    }
}

fn transport_in(phase: &Phase) -> Transport {
    let details = TransportDetails::try_from(details_input()).expect("valid details");
    let number = TrackingNumber::new("TR-LVN9XK00-QW12").expect("tracking number");
    Transport::begin(details, number, phase, None, start()).transport
}

fn make_service(
    phases: MockPhaseRepository,
    transports: MockTransportRepository,
    notifier: MockNotifier,
    clock: Arc<MutableClock>,
) -> Service {
    TransportLifecycleService::new(
        Arc::new(phases),
        Arc::new(transports),
        NotificationDispatcher::new(Arc::new(notifier), "https://track.example"),
        clock,
    )
}

fn silent_notifier() -> MockNotifier {
    let mut notifier = MockNotifier::new();
    notifier.expect_send().times(0);
    notifier
}

#[rstest]
#[tokio::test]
async fn create_reports_every_missing_field(operator: Operator, clock: Arc<MutableClock>) {
    let mut phases = MockPhaseRepository::new();
    phases.expect_first().times(0);
    let mut transports = MockTransportRepository::new();
    transports.expect_create().times(0);

    let service = make_service(phases, transports, silent_notifier(), clock);
    let request = NewTransportRequest {
        details: TransportDetailsInput {
            customer_email: String::new(),
            origin_location: " ".to_owned(),
            ..details_input()
        },
        ..NewTransportRequest::default()
    };
    let error = service
        .create_transport(&operator, request)
        .await
        .expect_err("validation fails");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let details = error.details().expect("details present");
    assert_eq!(
        details["fields"],
        serde_json::json!(["customerEmail", "originLocation"])
    );
}

#[rstest]
#[tokio::test]
async fn create_without_phases_is_rejected(operator: Operator, clock: Arc<MutableClock>) {
    let mut phases = MockPhaseRepository::new();
    phases.expect_first().times(1).return_once(|| Ok(None));
    let mut transports = MockTransportRepository::new();
    transports.expect_create().times(0);

    let service = make_service(phases, transports, silent_notifier(), clock);
    let request = NewTransportRequest {
        details: details_input(),
        ..NewTransportRequest::default()
    };
    let error = service
        .create_transport(&operator, request)
        .await
        .expect_err("no phases");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(error.message(), "no phases defined");
}

#[rstest]
#[tokio::test]
async fn create_with_unknown_phase_is_rejected(operator: Operator, clock: Arc<MutableClock>) {
    let mut phases = MockPhaseRepository::new();
    phases.expect_find_by_id().times(1).return_once(|_| Ok(None));
    let service = make_service(phases, MockTransportRepository::new(), silent_notifier(), clock);
    let request = NewTransportRequest {
        details: details_input(),
        phase_id: Some(PhaseId::random()),
        notes: None,
    };

    let error = service
        .create_transport(&operator, request)
        .await
        .expect_err("unknown phase");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn create_starts_in_first_phase_and_notifies(
    operator: Operator,
    clock: Arc<MutableClock>,
) {
    let first = phase("Priprema", 2, 0);
    let first_id = first.id;
    let mut phases = MockPhaseRepository::new();
    phases
        .expect_first()
        .times(1)
        .return_once(move || Ok(Some(first)));
    let mut transports = MockTransportRepository::new();
    let mut collisions = 1;
    transports
        .expect_create()
        .withf(move |transport, entry| {
            transport.current_phase_id == first_id
                && entry.phase_id == first_id
                && entry.days_in_phase.is_none()
        })
        .times(2)
        .returning(move |transport, _| {
            if collisions > 0 {
                collisions -= 1;
                return Err(TransportRepositoryError::duplicate_tracking_number(
                    transport.tracking_number.to_string(),
                ));
            }
            Ok(())
        });
    let mut notifier = MockNotifier::new();
    notifier
        .expect_send()
        .withf(|message| {
            message.to == "petar@example.com"
                && message.subject.starts_with("Transport started - TR-")
        })
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(phases, transports, notifier, clock);
    let request = NewTransportRequest {
        details: details_input(),
        notes: Some("  hitno  ".to_owned()),
        ..NewTransportRequest::default()
    };
    let created = service
        .create_transport(&operator, request)
        .await
        .expect("transport created");

    assert_eq!(created.transport.status, TransportStatus::Active);
    assert_eq!(created.transport.days_to_complete_phase.get(), 2);
    assert_eq!(created.transport.notes.as_deref(), Some("hitno"));
    assert_eq!(created.transport.phase_started_at, start());
    assert_eq!(
        created.current_phase.map(|phase| phase.name),
        Some("Priprema".to_owned())
    );
}

#[rstest]
#[tokio::test]
async fn create_gives_up_after_repeated_collisions(
    operator: Operator,
    clock: Arc<MutableClock>,
) {
    let first = phase("Priprema", 2, 0);
    let mut phases = MockPhaseRepository::new();
    phases
        .expect_first()
        .times(1)
        .return_once(move || Ok(Some(first)));
    let mut transports = MockTransportRepository::new();
    transports
        .expect_create()
        .times(TRACKING_NUMBER_ATTEMPTS)
        .returning(|transport, _| {
            Err(TransportRepositoryError::duplicate_tracking_number(
                transport.tracking_number.to_string(),
            ))
        });

    let service = make_service(phases, transports, silent_notifier(), clock);
    let request = NewTransportRequest {
        details: details_input(),
        ..NewTransportRequest::default()
    };
    let error = service
        .create_transport(&operator, request)
        .await
        .expect_err("collisions exhaust retries");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn advance_records_history_and_notifies(operator: Operator, clock: Arc<MutableClock>) {
    let current = phase("Priprema", 2, 0);
    let next = phase("Preuzimanje", 3, 1);
    let transport = transport_in(&current);
    let transport_id = transport.id;
    let (current_id, next_id) = (current.id, next.id);

    let mut phases = MockPhaseRepository::new();
    phases
        .expect_find_by_id()
        .with(eq(next_id))
        .times(1)
        .return_once(move |_| Ok(Some(next)));
    phases
        .expect_find_by_id()
        .with(eq(current_id))
        .times(1)
        .return_once(move |_| Ok(Some(current)));
    let mut transports = MockTransportRepository::new();
    transports
        .expect_find_by_id()
        .with(eq(transport_id))
        .times(1)
        .return_once(move |_| Ok(Some(transport)));
    transports
        .expect_record_transition()
        .withf(move |transport, entry| {
            transport.current_phase_id == next_id
                && transport.days_to_complete_phase.get() == 3
                && entry.phase_name == "Preuzimanje"
                && entry.days_in_phase == Some(1)
        })
        .times(1)
        .return_once(|_, _| Ok(()));
    let mut notifier = MockNotifier::new();
    notifier
        .expect_send()
        .withf(|message| {
            message.subject == "Transport status updated - TR-LVN9XK00-QW12"
                && message.html.contains("Priprema")
                && message.html.contains("3 days")
        })
        .times(1)
        .return_once(|_| Ok(()));

    clock.advance(Duration::hours(20));
    let service = make_service(phases, transports, notifier, Arc::clone(&clock));
    let advanced = service
        .advance_phase(&operator, transport_id, next_id, None)
        .await
        .expect("phase advanced");

    assert_eq!(advanced.current_phase_id, next_id);
    assert_eq!(advanced.phase_started_at, start() + Duration::hours(20));
}

#[rstest]
#[tokio::test]
async fn advance_to_current_phase_changes_nothing(operator: Operator, clock: Arc<MutableClock>) {
    let current = phase("Priprema", 2, 0);
    let transport = transport_in(&current);
    let (transport_id, current_id) = (transport.id, current.id);
    let expected = transport.clone();

    let mut phases = MockPhaseRepository::new();
    phases
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(current)));
    let mut transports = MockTransportRepository::new();
    transports
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(transport)));
    transports.expect_record_transition().times(0);

    let service = make_service(phases, transports, silent_notifier(), clock);
    let result = service
        .advance_phase(&operator, transport_id, current_id, None)
        .await
        .expect("no-op succeeds");

    assert_eq!(result, expected);
}

#[rstest]
#[tokio::test]
async fn advance_unknown_transport_is_not_found(operator: Operator, clock: Arc<MutableClock>) {
    let mut transports = MockTransportRepository::new();
    transports
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(None));

    let service = make_service(
        MockPhaseRepository::new(),
        transports,
        silent_notifier(),
        clock,
    );
    let error = service
        .advance_phase(&operator, TransportId::random(), PhaseId::random(), None)
        .await
        .expect_err("unknown transport");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case(TransportStatus::Completed, 1)]
#[case(TransportStatus::Cancelled, 0)]
#[case(TransportStatus::Active, 0)]
#[tokio::test]
async fn only_completion_notifies_customer(
    operator: Operator,
    clock: Arc<MutableClock>,
    #[case] status: TransportStatus,
    #[case] notifications: usize,
) {
    let transport = transport_in(&phase("Isporuka", 1, 4));
    let transport_id = transport.id;
    let mut transports = MockTransportRepository::new();
    transports
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(transport)));
    transports
        .expect_update()
        .withf(move |updated| updated.status == status)
        .times(1)
        .return_once(|_| Ok(()));
    transports.expect_record_transition().times(0);
    let mut notifier = MockNotifier::new();
    notifier
        .expect_send()
        .withf(|message| message.subject.starts_with("Transport completed - "))
        .times(notifications)
        .returning(|_| Ok(()));

    let service = make_service(MockPhaseRepository::new(), transports, notifier, clock);
    let updated = service
        .set_status(&operator, transport_id, status)
        .await
        .expect("status set");

    assert_eq!(updated.status, status);
}

#[rstest]
#[tokio::test]
async fn failed_notification_does_not_fail_completion(
    operator: Operator,
    clock: Arc<MutableClock>,
) {
    let transport = transport_in(&phase("Isporuka", 1, 4));
    let transport_id = transport.id;
    let mut transports = MockTransportRepository::new();
    transports
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(transport)));
    transports.expect_update().times(1).return_once(|_| Ok(()));
    let mut notifier = MockNotifier::new();
    notifier
        .expect_send()
        .times(1)
        .return_once(|_| Err(NotifierError::rejected(500_u16, "provider down")));

    let service = make_service(MockPhaseRepository::new(), transports, notifier, clock);
    let updated = service
        .set_status(&operator, transport_id, TransportStatus::Completed)
        .await
        .expect("completion persists");

    assert_eq!(updated.status, TransportStatus::Completed);
}

#[rstest]
#[tokio::test]
async fn update_without_phase_change_applies_days_and_notes(
    operator: Operator,
    clock: Arc<MutableClock>,
) {
    let current = phase("Transport", 5, 2);
    let transport = transport_in(&current);
    let (transport_id, current_id) = (transport.id, current.id);
    let mut phases = MockPhaseRepository::new();
    phases
        .expect_find_by_id()
        .with(eq(current_id))
        .times(1)
        .return_once(move |_| Ok(Some(current)));
    let mut transports = MockTransportRepository::new();
    transports
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(transport)));
    transports.expect_record_transition().times(0);
    transports.expect_update().times(2).returning(|_| Ok(()));

    let service = make_service(phases, transports, silent_notifier(), clock);
    let request = TransportUpdateRequest {
        phase_id: Some(current_id),
        days_to_complete_phase: Some(DayCount::new(9).expect("positive")),
        status: None,
        notes: Some(Some("granica".to_owned())),
    };
    let updated = service
        .update_transport(&operator, transport_id, request)
        .await
        .expect("update succeeds");

    assert_eq!(updated.transport.days_to_complete_phase.get(), 9);
    assert_eq!(updated.transport.notes.as_deref(), Some("granica"));
    assert_eq!(updated.transport.current_phase_id, current_id);
}

#[rstest]
#[tokio::test]
async fn delete_missing_transport_is_not_found(operator: Operator, clock: Arc<MutableClock>) {
    let mut transports = MockTransportRepository::new();
    transports.expect_delete().times(1).return_once(|_| Ok(false));

    let service = make_service(
        MockPhaseRepository::new(),
        transports,
        silent_notifier(),
        clock,
    );
    let error = service
        .delete_transport(&operator, TransportId::random())
        .await
        .expect_err("missing transport");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_removes_history_and_tracking(operator: Operator, clock: Arc<MutableClock>) {
    let store = Arc::new(InMemoryStore::new());
    let first = phase("Priprema", 2, 0);
    let second = phase("Preuzimanje", 3, 1);
    for entry in [&first, &second] {
        store.insert(entry).await.expect("phase stored");
    }
    let service = TransportLifecycleService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        NotificationDispatcher::new(Arc::new(RecordingNotifier::new()), "https://track.example"),
        clock,
    );
    let request = NewTransportRequest {
        details: details_input(),
        phase_id: Some(first.id),
        notes: None,
    };
    let created = service
        .create_transport(&operator, request)
        .await
        .expect("transport created")
        .transport;
    service
        .advance_phase(&operator, created.id, second.id, None)
        .await
        .expect("phase advanced");
    assert_eq!(store.history_of(created.id).len(), 2);

    service
        .delete_transport(&operator, created.id)
        .await
        .expect("transport deleted");

    assert!(store.history_of(created.id).is_empty());
    let error = service
        .get_by_tracking_number(created.tracking_number.as_str())
        .await
        .expect_err("deleted transport is gone");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn blank_tracking_number_is_invalid(clock: Arc<MutableClock>, #[case] raw: &str) {
    let mut transports = MockTransportRepository::new();
    transports.expect_find_by_tracking_number().times(0);

    let service = make_service(
        MockPhaseRepository::new(),
        transports,
        silent_notifier(),
        clock,
    );
    let error = service
        .get_by_tracking_number(raw)
        .await
        .expect_err("blank lookup");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn unknown_tracking_number_is_not_found(clock: Arc<MutableClock>) {
    let mut transports = MockTransportRepository::new();
    transports
        .expect_find_by_tracking_number()
        .times(1)
        .return_once(|_| Ok(None));

    let service = make_service(
        MockPhaseRepository::new(),
        transports,
        silent_notifier(),
        clock,
    );
    let error = service
        .get_by_tracking_number("TR-NOPE-0000")
        .await
        .expect_err("unknown number");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn tracking_view_carries_countdown_and_catalogue(clock: Arc<MutableClock>) {
    let first = phase("Priprema", 2, 0);
    let second = phase("Preuzimanje", 3, 1);
    let transport = transport_in(&first);
    let history = vec![PhaseHistoryEntry::initial(transport.id, &first, start())];
    let catalogue = vec![first.clone(), second];
    let mut phases = MockPhaseRepository::new();
    phases
        .expect_list()
        .times(1)
        .return_once(move || Ok(catalogue));
    let mut transports = MockTransportRepository::new();
    transports
        .expect_find_by_tracking_number()
        .withf(|number| number.as_str() == "TR-LVN9XK00-QW12")
        .times(1)
        .return_once(move |_| Ok(Some(transport)));
    transports
        .expect_history()
        .times(1)
        .return_once(move |_| Ok(history));

    clock.advance(Duration::hours(30));
    let service = make_service(phases, transports, silent_notifier(), Arc::clone(&clock));
    let view = service
        .get_by_tracking_number("  TR-LVN9XK00-QW12 ")
        .await
        .expect("view built");

    assert_eq!(view.current_phase.map(|phase| phase.id), Some(first.id));
    assert_eq!(view.phases.len(), 2);
    assert_eq!(view.history.len(), 1);
    assert_eq!(
        view.countdown,
        Countdown {
            days: 0,
            hours: 18,
            minutes: 0,
            expired: false,
        }
    );
}
