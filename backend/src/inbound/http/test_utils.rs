//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::ports::{MockAccessGate, MockPhaseCatalog, MockTransportLifecycle};
use crate::domain::{Error, Operator};

use super::state::HttpState;

/// Session middleware with a fresh key, cookie name `session`, and the
/// `Secure` flag off for plain HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Access gate double that always authorises `admin`.
pub fn signed_in_gate() -> MockAccessGate {
    let mut access = MockAccessGate::new();
    access
        .expect_authorize()
        .returning(|_| Ok(Operator::new("admin")));
    access
}

/// Access gate double that rejects every request.
pub fn signed_out_gate() -> MockAccessGate {
    let mut access = MockAccessGate::new();
    access
        .expect_authorize()
        .returning(|_| Err(Error::unauthorized("login required")));
    access
}

/// Assemble handler state from individual doubles.
pub fn state_with(
    phases: MockPhaseCatalog,
    transports: MockTransportLifecycle,
    access: MockAccessGate,
) -> HttpState {
    HttpState::new(Arc::new(phases), Arc::new(transports), Arc::new(access))
}
