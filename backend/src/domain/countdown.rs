//! Remaining time in the current phase.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::DayCount;

/// Whole days, hours and minutes left before the current phase is due.
///
/// Derived on every read and never stored. Once the deadline has passed all
/// components are zero and `expired` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub expired: bool,
}

impl Countdown {
    const EXPIRED: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        expired: true,
    };

    /// Compute the countdown for a phase started at `phase_started_at`.
    ///
    /// A deadline past the representable calendar saturates at the latest
    /// instant chrono supports.
    ///
    /// # Examples
    /// ```
    /// use chrono::{Duration, Utc};
    /// use tracker_backend::domain::{Countdown, DayCount};
    ///
    /// let now = Utc::now();
    /// let days = DayCount::new(2).expect("positive");
    /// let countdown = Countdown::remaining(now - Duration::hours(1), days, now);
    /// assert_eq!((countdown.days, countdown.hours, countdown.minutes), (1, 23, 0));
    /// assert!(!countdown.expired);
    /// ```
    #[must_use]
    pub fn remaining(phase_started_at: DateTime<Utc>, days: DayCount, now: DateTime<Utc>) -> Self {
        let deadline = phase_started_at
            .checked_add_signed(Duration::days(i64::from(days.get())))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let remaining = deadline - now;
        if remaining <= Duration::zero() {
            return Self::EXPIRED;
        }
        let days = remaining.num_days();
        let hours = (remaining - Duration::days(days)).num_hours();
        let minutes = (remaining - Duration::days(days) - Duration::hours(hours)).num_minutes();
        Self {
            days,
            hours,
            minutes,
            expired: false,
        }
    }
}
