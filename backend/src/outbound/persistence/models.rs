//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions to domain types live next to
//! the row structs so every adapter decodes rows the same way.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Admin, DayCount, PasswordHash, Phase, PhaseHistoryEntry, PhaseId, TrackingNumber, Transport,
    TransportDetails, TransportId, TransportStatus,
};

use super::schema::{admins, phase_history, phases, transports};

/// Raised when a stored row violates a domain invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("corrupt {table} row {id}: {reason}")]
pub(crate) struct CorruptRow {
    pub table: &'static str,
    pub id: Uuid,
    pub reason: String,
}

impl CorruptRow {
    fn new(table: &'static str, id: Uuid, reason: impl ToString) -> Self {
        Self {
            table,
            id,
            reason: reason.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = phases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PhaseRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub sort_order: i32,
    pub default_days_to_complete: i32,
    pub color: String,
    pub icon_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable and changeset form of a phase.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = phases)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PhaseRecord<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub sort_order: i32,
    pub default_days_to_complete: i32,
    pub color: &'a str,
    pub icon_name: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Phase> for PhaseRecord<'a> {
    fn from(phase: &'a Phase) -> Self {
        Self {
            id: *phase.id.as_uuid(),
            name: &phase.name,
            description: phase.description.as_deref(),
            sort_order: phase.order,
            default_days_to_complete: phase.default_days_to_complete.get(),
            color: &phase.color,
            icon_name: &phase.icon_name,
            created_at: phase.created_at,
            updated_at: phase.updated_at,
        }
    }
}

impl TryFrom<PhaseRow> for Phase {
    type Error = CorruptRow;

    fn try_from(row: PhaseRow) -> Result<Self, Self::Error> {
        let default_days_to_complete = DayCount::new(i64::from(row.default_days_to_complete))
            .map_err(|err| CorruptRow::new("phases", row.id, err))?;
        Ok(Self {
            id: PhaseId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            order: row.sort_order,
            default_days_to_complete,
            color: row.color,
            icon_name: row.icon_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Transports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = transports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TransportRow {
    pub id: Uuid,
    pub tracking_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_year: Option<i32>,
    pub vehicle_vin: Option<String>,
    pub origin_location: String,
    pub destination_location: String,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub current_phase_id: Uuid,
    pub phase_started_at: DateTime<Utc>,
    pub days_to_complete_phase: i32,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = transports)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct TransportRecord<'a> {
    pub id: Uuid,
    pub tracking_number: &'a str,
    pub customer_name: &'a str,
    pub customer_email: &'a str,
    pub vehicle_make: &'a str,
    pub vehicle_model: &'a str,
    pub vehicle_year: Option<i32>,
    pub vehicle_vin: Option<&'a str>,
    pub origin_location: &'a str,
    pub destination_location: &'a str,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub current_phase_id: Uuid,
    pub phase_started_at: DateTime<Utc>,
    pub days_to_complete_phase: i32,
    pub status: &'static str,
    pub notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Transport> for TransportRecord<'a> {
    fn from(transport: &'a Transport) -> Self {
        let details = &transport.details;
        Self {
            id: *transport.id.as_uuid(),
            tracking_number: transport.tracking_number.as_str(),
            customer_name: &details.customer_name,
            customer_email: &details.customer_email,
            vehicle_make: &details.vehicle_make,
            vehicle_model: &details.vehicle_model,
            vehicle_year: details.vehicle_year,
            vehicle_vin: details.vehicle_vin.as_deref(),
            origin_location: &details.origin_location,
            destination_location: &details.destination_location,
            estimated_delivery: details.estimated_delivery,
            current_phase_id: *transport.current_phase_id.as_uuid(),
            phase_started_at: transport.phase_started_at,
            days_to_complete_phase: transport.days_to_complete_phase.get(),
            status: transport.status.as_str(),
            notes: transport.notes.as_deref(),
            created_at: transport.created_at,
            updated_at: transport.updated_at,
        }
    }
}

impl TryFrom<TransportRow> for Transport {
    type Error = CorruptRow;

    fn try_from(row: TransportRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<TransportStatus>()
            .map_err(|err| CorruptRow::new("transports", row.id, err))?;
        let days_to_complete_phase = DayCount::new(i64::from(row.days_to_complete_phase))
            .map_err(|err| CorruptRow::new("transports", row.id, err))?;
        let tracking_number = TrackingNumber::new(&row.tracking_number)
            .map_err(|err| CorruptRow::new("transports", row.id, err))?;
        Ok(Self {
            id: TransportId::from_uuid(row.id),
            tracking_number,
            details: TransportDetails {
                customer_name: row.customer_name,
                customer_email: row.customer_email,
                vehicle_make: row.vehicle_make,
                vehicle_model: row.vehicle_model,
                vehicle_year: row.vehicle_year,
                vehicle_vin: row.vehicle_vin,
                origin_location: row.origin_location,
                destination_location: row.destination_location,
                estimated_delivery: row.estimated_delivery,
            },
            current_phase_id: PhaseId::from_uuid(row.current_phase_id),
            phase_started_at: row.phase_started_at,
            days_to_complete_phase,
            status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Phase history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = phase_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PhaseHistoryRow {
    pub id: Uuid,
    pub transport_id: Uuid,
    pub phase_id: Uuid,
    pub phase_name: String,
    pub changed_at: DateTime<Utc>,
    pub days_in_phase: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = phase_history)]
pub(crate) struct NewPhaseHistoryRow<'a> {
    pub id: Uuid,
    pub transport_id: Uuid,
    pub phase_id: Uuid,
    pub phase_name: &'a str,
    pub changed_at: DateTime<Utc>,
    pub days_in_phase: Option<i32>,
    pub notes: Option<&'a str>,
}

impl<'a> From<&'a PhaseHistoryEntry> for NewPhaseHistoryRow<'a> {
    fn from(entry: &'a PhaseHistoryEntry) -> Self {
        Self {
            id: entry.id,
            transport_id: *entry.transport_id.as_uuid(),
            phase_id: *entry.phase_id.as_uuid(),
            phase_name: &entry.phase_name,
            changed_at: entry.changed_at,
            days_in_phase: entry.days_in_phase,
            notes: entry.notes.as_deref(),
        }
    }
}

impl From<PhaseHistoryRow> for PhaseHistoryEntry {
    fn from(row: PhaseHistoryRow) -> Self {
        Self {
            id: row.id,
            transport_id: TransportId::from_uuid(row.transport_id),
            phase_id: PhaseId::from_uuid(row.phase_id),
            phase_name: row.phase_name,
            changed_at: row.changed_at,
            days_in_phase: row.days_in_phase,
            notes: row.notes,
        }
    }
}

// ---------------------------------------------------------------------------
// Admins
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = admins)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AdminRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = admins)]
pub(crate) struct NewAdminRow<'a> {
    pub id: Uuid,
    pub singleton: bool,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Admin> for NewAdminRow<'a> {
    fn from(admin: &'a Admin) -> Self {
        Self {
            id: admin.id,
            singleton: true,
            username: &admin.username,
            password_hash: admin.password_hash.as_str(),
            created_at: admin.created_at,
            updated_at: admin.updated_at,
        }
    }
}

impl From<AdminRow> for Admin {
    fn from(row: AdminRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password_hash: PasswordHash::from_stored(row.password_hash),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
