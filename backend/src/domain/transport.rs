//! Transport aggregate and its value types.
//!
//! A transport is one vehicle shipment. Its lifecycle state is the pair
//! `(status, current_phase_id)`; every phase change appends a
//! [`PhaseHistoryEntry`] so `current_phase_id` always matches the phase of the
//! newest history entry.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DayCount, Phase, PhaseHistoryEntry, PhaseId};

const TRACKING_PREFIX: &str = "TR";
const TRACKING_SUFFIX_LEN: usize = 4;
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Stable transport identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportId(Uuid);

impl TransportId {
    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TransportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransportId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// Public identifier customers use to look up a transport.
///
/// Generated numbers have the shape `TR-<millis base36>-<4 base36 chars>`,
/// upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingNumber(String);

/// Raised when a tracking number lookup key is blank.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tracking number must not be empty")]
pub struct EmptyTrackingNumber;

impl TrackingNumber {
    /// Accept a caller-supplied tracking number, trimming whitespace.
    pub fn new(raw: &str) -> Result<Self, EmptyTrackingNumber> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmptyTrackingNumber);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Generate a new tracking number from the current instant.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use tracker_backend::domain::TrackingNumber;
    ///
    /// let number = TrackingNumber::generate(Utc::now(), &mut rand::thread_rng());
    /// assert!(number.as_str().starts_with("TR-"));
    /// ```
    pub fn generate<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let suffix: String = (0..TRACKING_SUFFIX_LEN)
            .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
            .collect();
        Self(format!("{TRACKING_PREFIX}-{}-{suffix}", to_base36(millis)))
    }

    /// The tracking number as shown to customers.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while value > 0 {
        let digit = usize::try_from(value % 36).unwrap_or_default();
        digits.push(char::from(BASE36[digit]));
        value /= 36;
    }
    digits.iter().rev().collect()
}

/// Lifecycle status of a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportStatus {
    /// In transit; the default for new transports.
    #[default]
    Active,
    /// Delivered. Entering this status notifies the customer.
    Completed,
    /// Called off by the operator.
    Cancelled,
}

impl TransportStatus {
    /// Storage and wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transport status: {0}")]
pub struct UnknownTransportStatus(pub String);

impl FromStr for TransportStatus {
    type Err = UnknownTransportStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownTransportStatus(other.to_owned())),
        }
    }
}

/// Unvalidated customer, vehicle and route fields of a new transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportDetailsInput {
    pub customer_name: String,
    pub customer_email: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_year: Option<i32>,
    pub vehicle_vin: Option<String>,
    pub origin_location: String,
    pub destination_location: String,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Required fields that were missing or blank, in wire (camelCase) form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required fields: {}", fields.join(", "))]
pub struct MissingTransportFields {
    pub fields: Vec<&'static str>,
}

/// Validated customer, vehicle and route fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportDetails {
    pub customer_name: String,
    pub customer_email: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_year: Option<i32>,
    pub vehicle_vin: Option<String>,
    pub origin_location: String,
    pub destination_location: String,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl TryFrom<TransportDetailsInput> for TransportDetails {
    type Error = MissingTransportFields;

    fn try_from(input: TransportDetailsInput) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        let mut required = |value: String, field: &'static str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                missing.push(field);
            }
            trimmed.to_owned()
        };
        let customer_email = required(input.customer_email, "customerEmail");
        let customer_name = required(input.customer_name, "customerName");
        let vehicle_make = required(input.vehicle_make, "vehicleMake");
        let vehicle_model = required(input.vehicle_model, "vehicleModel");
        let origin_location = required(input.origin_location, "originLocation");
        let destination_location = required(input.destination_location, "destinationLocation");
        if !missing.is_empty() {
            return Err(MissingTransportFields { fields: missing });
        }
        Ok(Self {
            customer_name,
            customer_email,
            vehicle_make,
            vehicle_model,
            vehicle_year: input.vehicle_year,
            vehicle_vin: input
                .vehicle_vin
                .map(|vin| vin.trim().to_owned())
                .filter(|vin| !vin.is_empty()),
            origin_location,
            destination_location,
            estimated_delivery: input.estimated_delivery,
        })
    }
}

impl TransportDetails {
    /// Human-readable vehicle label, e.g. `Audi A4`.
    #[must_use]
    pub fn vehicle_label(&self) -> String {
        format!("{} {}", self.vehicle_make, self.vehicle_model)
    }
}

/// A vehicle shipment and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transport {
    pub id: TransportId,
    pub tracking_number: TrackingNumber,
    #[serde(flatten)]
    pub details: TransportDetails,
    pub current_phase_id: PhaseId,
    pub phase_started_at: DateTime<Utc>,
    pub days_to_complete_phase: DayCount,
    pub status: TransportStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A phase change: the updated transport and the history entry recording it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTransition {
    pub transport: Transport,
    pub entry: PhaseHistoryEntry,
}

impl Transport {
    /// Create a transport in `phase` together with its initial history entry.
    #[must_use]
    pub fn begin(
        details: TransportDetails,
        tracking_number: TrackingNumber,
        phase: &Phase,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> PhaseTransition {
        let id = TransportId::random();
        let transport = Self {
            id,
            tracking_number,
            details,
            current_phase_id: phase.id,
            phase_started_at: now,
            days_to_complete_phase: phase.default_days_to_complete,
            status: TransportStatus::Active,
            notes,
            created_at: now,
            updated_at: now,
        };
        PhaseTransition {
            transport,
            entry: PhaseHistoryEntry::initial(id, phase, now),
        }
    }

    /// Move into `phase`, restarting the phase clock.
    ///
    /// Returns `None` when `phase` is already the current phase.
    #[must_use]
    pub fn advance_to(
        &self,
        phase: &Phase,
        days_override: Option<DayCount>,
        now: DateTime<Utc>,
    ) -> Option<PhaseTransition> {
        if self.current_phase_id == phase.id {
            return None;
        }
        let entry = PhaseHistoryEntry::transition(self.id, phase, self.phase_started_at, now);
        let transport = Self {
            current_phase_id: phase.id,
            phase_started_at: now,
            days_to_complete_phase: days_override.unwrap_or(phase.default_days_to_complete),
            updated_at: now,
            ..self.clone()
        };
        Some(PhaseTransition { transport, entry })
    }

    /// Set the lifecycle status and bump `updated_at`.
    #[must_use]
    pub fn with_status(self, status: TransportStatus, now: DateTime<Utc>) -> Self {
        Self {
            status,
            updated_at: now,
            ..self
        }
    }

    /// Replace the operator notes. `None` clears them.
    #[must_use]
    pub fn with_notes(self, notes: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            notes,
            updated_at: now,
            ..self
        }
    }

    /// Override the expected duration of the current phase.
    #[must_use]
    pub fn with_days_to_complete_phase(self, days: DayCount, now: DateTime<Utc>) -> Self {
        Self {
            days_to_complete_phase: days,
            updated_at: now,
            ..self
        }
    }
}
