//! Append-only phase history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Phase, PhaseId, TransportId};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// One recorded phase transition of a transport.
///
/// `phase_name` is a snapshot taken when the entry is written; it is never
/// refreshed from the catalogue, so renaming or deleting a phase leaves the
/// history readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseHistoryEntry {
    pub id: Uuid,
    pub transport_id: TransportId,
    pub phase_id: PhaseId,
    pub phase_name: String,
    pub changed_at: DateTime<Utc>,
    /// Whole days spent in the phase that preceded this entry.
    pub days_in_phase: Option<i32>,
    pub notes: Option<String>,
}

impl PhaseHistoryEntry {
    /// Entry written when a transport is created in `phase`.
    #[must_use]
    pub fn initial(transport_id: TransportId, phase: &Phase, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transport_id,
            phase_id: phase.id,
            phase_name: phase.name.clone(),
            changed_at: now,
            days_in_phase: None,
            notes: None,
        }
    }

    /// Entry written when a transport moves into `phase`.
    #[must_use]
    pub fn transition(
        transport_id: TransportId,
        phase: &Phase,
        previous_phase_started_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            days_in_phase: Some(days_in_phase(previous_phase_started_at, now)),
            ..Self::initial(transport_id, phase, now)
        }
    }
}

/// Whole days between `started_at` and `now`, rounded up and never negative.
///
/// # Examples
/// ```
/// use chrono::{Duration, Utc};
/// use tracker_backend::domain::days_in_phase;
///
/// let now = Utc::now();
/// assert_eq!(days_in_phase(now - Duration::hours(25), now), 2);
/// assert_eq!(days_in_phase(now + Duration::hours(1), now), 0);
/// ```
#[must_use]
pub fn days_in_phase(started_at: DateTime<Utc>, now: DateTime<Utc>) -> i32 {
    let elapsed = (now - started_at).num_milliseconds();
    if elapsed <= 0 {
        return 0;
    }
    let partial = i64::from(elapsed.rem_euclid(MILLIS_PER_DAY) > 0);
    let days = elapsed.div_euclid(MILLIS_PER_DAY) + partial;
    i32::try_from(days).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::zero(), 0)]
    #[case(Duration::seconds(1), 1)]
    #[case(Duration::days(1), 1)]
    #[case(Duration::days(1) + Duration::seconds(1), 2)]
    #[case(Duration::days(1) + Duration::milliseconds(500), 2)]
    #[case(Duration::milliseconds(1), 1)]
    #[case(Duration::days(3) - Duration::minutes(5), 3)]
    #[case(Duration::days(-2), 0)]
    fn days_in_phase_rounds_up(#[case] elapsed: Duration, #[case] expected: i32) {
        let now = Utc::now();
        assert_eq!(days_in_phase(now - elapsed, now), expected);
    }
}
