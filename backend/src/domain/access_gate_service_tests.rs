//! Tests for the access gate service.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::MockAdminRepository;
use crate::test_support::MutableClock;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
        .single()
        .expect("valid instant")
}

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::new(start()))
}

fn admin(password: &str) -> Admin {
    let password = NewPassword::new(password).expect("valid password");
    let hash = PasswordHash::derive(&password, &mut rand::thread_rng());
    Admin::new("admin", hash, start())
}

fn existing(password: &'static str) -> MockAdminRepository {
    let mut repo = MockAdminRepository::new();
    repo.expect_find()
        .returning(move || Ok(Some(admin(password))));
    repo
}

fn empty() -> MockAdminRepository {
    let mut repo = MockAdminRepository::new();
    repo.expect_find().returning(|| Ok(None));
    repo
}

fn service(repo: MockAdminRepository, clock: Arc<MutableClock>) -> AccessGateService<MockAdminRepository> {
    AccessGateService::new(Arc::new(repo), clock)
}

#[rstest]
#[tokio::test]
async fn fresh_deployment_needs_setup(clock: Arc<MutableClock>) {
    let status = service(empty(), clock)
        .check_status(None)
        .await
        .expect("status");

    assert_eq!(
        status,
        AccessStatus {
            authenticated: false,
            needs_setup: true,
            username: None,
        }
    );
}

#[rstest]
#[tokio::test]
async fn valid_grant_reports_username(clock: Arc<MutableClock>) {
    let grant = SessionGrant::issue(start());
    let status = service(existing("tajna123"), clock)
        .check_status(Some(grant))
        .await
        .expect("status");

    assert!(status.authenticated);
    assert!(!status.needs_setup);
    assert_eq!(status.username.as_deref(), Some("admin"));
}

#[rstest]
#[tokio::test]
async fn setup_creates_account_and_signs_in(clock: Arc<MutableClock>) {
    let mut repo = empty();
    repo.expect_insert_if_absent()
        .withf(|admin| admin.username == "operater" && admin.password_hash.verify("lozinka1"))
        .times(1)
        .return_once(|_| Ok(true));

    let signed_in = service(repo, clock)
        .setup("  operater ", "lozinka1")
        .await
        .expect("setup succeeds");

    assert_eq!(signed_in.username, "operater");
    assert_eq!(signed_in.grant.issued_at, start());
}

#[rstest]
#[tokio::test]
async fn setup_is_refused_once_account_exists(clock: Arc<MutableClock>) {
    let mut repo = existing("tajna123");
    repo.expect_insert_if_absent().times(0);

    let error = service(repo, clock)
        .setup("drugi", "lozinka1")
        .await
        .expect_err("already set up");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn setup_race_loser_gets_conflict(clock: Arc<MutableClock>) {
    let mut repo = empty();
    repo.expect_insert_if_absent()
        .times(1)
        .return_once(|_| Ok(false));

    let error = service(repo, clock)
        .setup("admin", "lozinka1")
        .await
        .expect_err("concurrent setup");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[rstest]
#[case("", "lozinka1")]
#[case("admin", "")]
#[case("admin", "kratk")]
#[tokio::test]
async fn setup_validates_credentials(
    clock: Arc<MutableClock>,
    #[case] username: &str,
    #[case] password: &str,
) {
    let mut repo = empty();
    repo.expect_insert_if_absent().times(0);

    let error = service(repo, clock)
        .setup(username, password)
        .await
        .expect_err("invalid credentials");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case("admin", "tajna123")]
#[case("", "")]
#[case("   ", "tajna123")]
#[tokio::test]
async fn login_before_setup_requires_setup(
    clock: Arc<MutableClock>,
    #[case] username: &str,
    #[case] password: &str,
) {
    let error = service(empty(), clock)
        .login(username, password)
        .await
        .expect_err("no account");

    assert_eq!(error.code(), ErrorCode::SetupRequired);
}

#[rstest]
#[case("", "tajna123", "username")]
#[case("admin", "", "password")]
#[tokio::test]
async fn login_validates_credentials_once_set_up(
    clock: Arc<MutableClock>,
    #[case] username: &str,
    #[case] password: &str,
    #[case] field: &str,
) {
    let error = service(existing("tajna123"), clock)
        .login(username, password)
        .await
        .expect_err("blank credentials");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    let fields = error.details().and_then(|details| details.get("fields")).cloned();
    assert_eq!(fields, Some(serde_json::json!([field])));
}

#[rstest]
#[case("admin", "pogresna")]
#[case("neko", "tajna123")]
#[tokio::test]
async fn login_rejects_wrong_credentials(
    clock: Arc<MutableClock>,
    #[case] username: &str,
    #[case] password: &str,
) {
    let error = service(existing("tajna123"), clock)
        .login(username, password)
        .await
        .expect_err("wrong credentials");

    assert_eq!(error.code(), ErrorCode::AuthenticationFailed);
}

#[rstest]
#[tokio::test]
async fn login_issues_fresh_grant(clock: Arc<MutableClock>) {
    let signed_in = service(existing("tajna123"), clock)
        .login("admin", "tajna123")
        .await
        .expect("login succeeds");

    assert!(signed_in.grant.is_valid_at(start()));
}

#[rstest]
#[tokio::test]
async fn authorize_requires_a_grant(clock: Arc<MutableClock>) {
    let error = service(existing("tajna123"), clock)
        .authorize(None)
        .await
        .expect_err("anonymous");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn authorize_rejects_expired_grant(clock: Arc<MutableClock>) {
    let grant = SessionGrant::issue(start());
    clock.advance(Duration::hours(24));

    let error = service(existing("tajna123"), Arc::clone(&clock))
        .authorize(Some(grant))
        .await
        .expect_err("expired");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn authorize_mints_operator(clock: Arc<MutableClock>) {
    let grant = SessionGrant::issue(start());
    clock.advance(Duration::hours(23));

    let operator = service(existing("tajna123"), Arc::clone(&clock))
        .authorize(Some(grant))
        .await
        .expect("authorised");

    assert_eq!(operator.username(), "admin");
}

#[rstest]
#[tokio::test]
async fn change_password_checks_current_password(clock: Arc<MutableClock>) {
    let mut repo = existing("tajna123");
    repo.expect_update_password().times(0);

    let error = service(repo, clock)
        .change_password(&Operator::new("admin"), "pogresna", "nova-lozinka")
        .await
        .expect_err("wrong current password");

    assert_eq!(error.code(), ErrorCode::AuthenticationFailed);
}

#[rstest]
#[tokio::test]
async fn change_password_rejects_short_password(clock: Arc<MutableClock>) {
    let mut repo = existing("tajna123");
    repo.expect_update_password().times(0);

    let error = service(repo, clock)
        .change_password(&Operator::new("admin"), "tajna123", "abc")
        .await
        .expect_err("too short");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn change_password_stores_new_digest(clock: Arc<MutableClock>) {
    let mut repo = existing("tajna123");
    repo.expect_update_password()
        .withf(|_, hash, updated_at| hash.verify("nova-lozinka") && *updated_at == start())
        .times(1)
        .return_once(|_, _, _| Ok(()));

    service(repo, clock)
        .change_password(&Operator::new("admin"), "tajna123", "nova-lozinka")
        .await
        .expect("password changed");
}

#[rstest]
#[tokio::test]
async fn repository_outage_is_service_unavailable(clock: Arc<MutableClock>) {
    let mut repo = MockAdminRepository::new();
    repo.expect_find()
        .returning(|| Err(AdminRepositoryError::connection("refused")));

    let error = service(repo, clock)
        .check_status(None)
        .await
        .expect_err("outage");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
