//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    AdminRepository, AdminRepositoryError, Notifier, NotifierError, PhaseRepository,
    PhaseRepositoryError, TransportRepository, TransportRepositoryError, TransportWithPhase,
};
use crate::domain::{
    Admin, EmailMessage, PasswordHash, Phase, PhaseHistoryEntry, PhaseId, TrackingNumber,
    Transport, TransportId, sort_catalogue,
};

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{name} mutex poisoned"),
    }
}

/// Clock whose current instant only moves when a test advances it.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Freeze the clock at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        *lock(&self.0, "clock") += delta;
    }

    /// Move the clock forward by whole days.
    pub fn advance_days(&self, days: i64) {
        self.advance(TimeDelta::days(days));
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0, "clock")
    }
}

#[derive(Default)]
struct StoreState {
    phases: Vec<Phase>,
    transports: Vec<Transport>,
    history: Vec<PhaseHistoryEntry>,
    admin: Option<Admin>,
}

/// In-memory implementation of every repository port.
///
/// Mirrors the storage rules of the database adapters: tracking numbers are
/// unique, phases referenced as a current phase cannot be deleted, and the
/// operator account is a singleton.
#[derive(Default)]
pub struct InMemoryStore(Mutex<StoreState>);

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        lock(&self.0, "store")
    }

    /// Every history entry for `id`, oldest first.
    pub fn history_of(&self, id: TransportId) -> Vec<PhaseHistoryEntry> {
        self.state()
            .history
            .iter()
            .filter(|entry| entry.transport_id == id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PhaseRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Phase>, PhaseRepositoryError> {
        let mut phases = self.state().phases.clone();
        sort_catalogue(&mut phases);
        Ok(phases)
    }

    async fn find_by_id(&self, id: &PhaseId) -> Result<Option<Phase>, PhaseRepositoryError> {
        Ok(self.state().phases.iter().find(|p| p.id == *id).cloned())
    }

    async fn first(&self) -> Result<Option<Phase>, PhaseRepositoryError> {
        Ok(self.list().await?.into_iter().next())
    }

    async fn count(&self) -> Result<u64, PhaseRepositoryError> {
        Ok(self.state().phases.len() as u64)
    }

    async fn insert(&self, phase: &Phase) -> Result<(), PhaseRepositoryError> {
        self.state().phases.push(phase.clone());
        Ok(())
    }

    async fn update(&self, phase: &Phase) -> Result<(), PhaseRepositoryError> {
        let mut state = self.state();
        match state.phases.iter_mut().find(|p| p.id == phase.id) {
            Some(existing) => {
                *existing = phase.clone();
                Ok(())
            }
            None => Err(PhaseRepositoryError::query("phase row missing")),
        }
    }

    async fn delete(&self, id: &PhaseId) -> Result<bool, PhaseRepositoryError> {
        let mut state = self.state();
        if state.transports.iter().any(|t| t.current_phase_id == *id) {
            return Err(PhaseRepositoryError::in_use(id.to_string()));
        }
        let before = state.phases.len();
        state.phases.retain(|p| p.id != *id);
        Ok(state.phases.len() != before)
    }

    async fn is_current_for_any_transport(&self, id: &PhaseId) -> Result<bool, PhaseRepositoryError> {
        Ok(self
            .state()
            .transports
            .iter()
            .any(|t| t.current_phase_id == *id))
    }
}

#[async_trait]
impl TransportRepository for InMemoryStore {
    async fn create(
        &self,
        transport: &Transport,
        initial_entry: &PhaseHistoryEntry,
    ) -> Result<(), TransportRepositoryError> {
        let mut state = self.state();
        if state
            .transports
            .iter()
            .any(|t| t.tracking_number == transport.tracking_number)
        {
            return Err(TransportRepositoryError::duplicate_tracking_number(
                transport.tracking_number.to_string(),
            ));
        }
        state.transports.push(transport.clone());
        state.history.push(initial_entry.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TransportId) -> Result<Option<Transport>, TransportRepositoryError> {
        Ok(self.state().transports.iter().find(|t| t.id == *id).cloned())
    }

    async fn find_by_tracking_number(
        &self,
        tracking_number: &TrackingNumber,
    ) -> Result<Option<Transport>, TransportRepositoryError> {
        Ok(self
            .state()
            .transports
            .iter()
            .find(|t| t.tracking_number == *tracking_number)
            .cloned())
    }

    async fn list_with_phase(&self) -> Result<Vec<TransportWithPhase>, TransportRepositoryError> {
        let state = self.state();
        let mut listed: Vec<_> = state
            .transports
            .iter()
            .map(|transport| TransportWithPhase {
                transport: transport.clone(),
                current_phase: state
                    .phases
                    .iter()
                    .find(|p| p.id == transport.current_phase_id)
                    .cloned(),
            })
            .collect();
        listed.sort_by(|a, b| b.transport.created_at.cmp(&a.transport.created_at));
        Ok(listed)
    }

    async fn history(&self, id: &TransportId) -> Result<Vec<PhaseHistoryEntry>, TransportRepositoryError> {
        let mut entries = self.history_of(*id);
        entries.reverse();
        Ok(entries)
    }

    async fn record_transition(
        &self,
        transport: &Transport,
        entry: &PhaseHistoryEntry,
    ) -> Result<(), TransportRepositoryError> {
        let mut state = self.state();
        let Some(existing) = state.transports.iter_mut().find(|t| t.id == transport.id) else {
            return Err(TransportRepositoryError::query("transport row missing"));
        };
        *existing = transport.clone();
        state.history.push(entry.clone());
        Ok(())
    }

    async fn update(&self, transport: &Transport) -> Result<(), TransportRepositoryError> {
        let mut state = self.state();
        match state.transports.iter_mut().find(|t| t.id == transport.id) {
            Some(existing) => {
                *existing = transport.clone();
                Ok(())
            }
            None => Err(TransportRepositoryError::query("transport row missing")),
        }
    }

    async fn delete(&self, id: &TransportId) -> Result<bool, TransportRepositoryError> {
        let mut state = self.state();
        let before = state.transports.len();
        state.transports.retain(|t| t.id != *id);
        state.history.retain(|entry| entry.transport_id != *id);
        Ok(state.transports.len() != before)
    }
}

#[async_trait]
impl AdminRepository for InMemoryStore {
    async fn find(&self) -> Result<Option<Admin>, AdminRepositoryError> {
        Ok(self.state().admin.clone())
    }

    async fn insert_if_absent(&self, admin: &Admin) -> Result<bool, AdminRepositoryError> {
        let mut state = self.state();
        if state.admin.is_some() {
            return Ok(false);
        }
        state.admin = Some(admin.clone());
        Ok(true)
    }

    async fn update_password(
        &self,
        id: &Uuid,
        password_hash: &PasswordHash,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AdminRepositoryError> {
        let mut state = self.state();
        match state.admin.as_mut().filter(|admin| admin.id == *id) {
            Some(admin) => {
                admin.password_hash = password_hash.clone();
                admin.updated_at = updated_at;
                Ok(())
            }
            None => Err(AdminRepositoryError::query("admin row missing")),
        }
    }
}

/// Notifier that keeps every message it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier(Mutex<Vec<EmailMessage>>);

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message sent so far, oldest first.
    pub fn sent(&self) -> Vec<EmailMessage> {
        lock(&self.0, "notifier").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifierError> {
        lock(&self.0, "notifier").push(message.clone());
        Ok(())
    }
}

pub mod openapi {
    //! OpenAPI schema traversal helpers.

    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::{Object, Schema};

    /// Extract an `Object` schema, panicking with a diagnostic otherwise.
    pub fn unwrap_object_schema<'a>(schema: &'a RefOr<Schema>, name: &str) -> &'a Object {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj,
            RefOr::Ref(reference) => panic!(
                "schema '{name}' is a $ref to '{}'; resolve the reference first",
                reference.ref_location
            ),
            _ => panic!("schema '{name}' is not an Object"),
        }
    }

    /// Get a property from an Object schema by name.
    pub fn get_property<'a>(obj: &'a Object, field: &str) -> &'a RefOr<Schema> {
        match obj.properties.get(field) {
            Some(property) => property,
            None => panic!("property '{field}' not found"),
        }
    }
}
