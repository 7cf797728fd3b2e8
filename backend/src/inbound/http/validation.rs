//! Shared request parsing helpers for inbound HTTP adapters.
//!
//! Every failure becomes `invalid_request` with `details.fields` naming the
//! offending JSON field, matching the errors the domain raises itself.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;

use crate::domain::{
    DayCount, Error, PhaseId, PhaseValidationError, TransportId, TransportStatus,
    phase_catalog_service::phase_validation_error,
};

pub(crate) fn invalid_field(field: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({ "fields": [field] }))
}

fn parse_id<T: FromStr>(raw: &str, field: &str) -> Result<T, Error> {
    T::from_str(raw).map_err(|_| invalid_field(field, format!("{field} must be a valid UUID")))
}

pub(crate) fn parse_phase_id(raw: &str, field: &str) -> Result<PhaseId, Error> {
    parse_id(raw, field)
}

pub(crate) fn parse_transport_id(raw: &str) -> Result<TransportId, Error> {
    parse_id(raw, "id")
}

pub(crate) fn parse_day_count(value: i64, field: &str) -> Result<DayCount, Error> {
    DayCount::new(value).map_err(|error| phase_validation_error(&error, field))
}

pub(crate) fn map_phase_field(field: &'static str) -> impl Fn(PhaseValidationError) -> Error {
    move |error| phase_validation_error(&error, field)
}

pub(crate) fn parse_status(raw: &str) -> Result<TransportStatus, Error> {
    TransportStatus::from_str(raw).map_err(|error| invalid_field("status", error.to_string()))
}

/// Accept an RFC 3339 instant or a bare `YYYY-MM-DD` date (midnight UTC).
pub(crate) fn parse_timestamp(raw: &str, field: &str) -> Result<DateTime<Utc>, Error> {
    let trimmed = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            invalid_field(
                field,
                format!("{field} must be an RFC 3339 timestamp or YYYY-MM-DD date"),
            )
        })
}

/// Treat blank optional strings as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
