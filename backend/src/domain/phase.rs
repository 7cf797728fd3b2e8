//! Phase catalogue entities.
//!
//! A phase is a named stage every transport passes through. Phases are kept
//! in a single ordered catalogue; `order` defines the sequence shown to
//! customers and the phase a new transport starts in.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default duration assigned to a phase when none is supplied.
pub const DEFAULT_PHASE_DAYS: i32 = 5;
/// Largest day count a phase or transport may carry (ten years).
pub const MAX_PHASE_DAYS: i32 = 3650;
/// Default display colour for a phase.
pub const DEFAULT_PHASE_COLOR: &str = "#10b981";
/// Default icon identifier for a phase.
pub const DEFAULT_PHASE_ICON: &str = "truck";

/// Validation failures for phase fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhaseValidationError {
    /// The phase name was blank.
    #[error("phase name must not be empty")]
    EmptyName,
    /// A day count was zero or negative.
    #[error("day count must be positive, got {value}")]
    NonPositiveDays { value: i64 },
    /// A day count exceeds [`MAX_PHASE_DAYS`].
    #[error("day count must be at most {max}, got {value}", max = MAX_PHASE_DAYS)]
    DaysOutOfRange { value: i64 },
}

/// Stable phase identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseId(Uuid);

impl PhaseId {
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

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PhaseId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// Whole number of days between 1 and [`MAX_PHASE_DAYS`].
///
/// # Examples
/// ```
/// use tracker_backend::domain::DayCount;
///
/// assert_eq!(DayCount::new(3).map(DayCount::get), Ok(3));
/// assert!(DayCount::new(0).is_err());
/// assert!(DayCount::new(100_000).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct DayCount(i32);

impl DayCount {
    /// Validate and wrap a day count.
    pub fn new(value: i64) -> Result<Self, PhaseValidationError> {
        if value <= 0 {
            return Err(PhaseValidationError::NonPositiveDays { value });
        }
        i32::try_from(value)
            .ok()
            .filter(|days| *days <= MAX_PHASE_DAYS)
            .map(Self)
            .ok_or(PhaseValidationError::DaysOutOfRange { value })
    }

    /// Raw day count.
    #[must_use]
    pub fn get(self) -> i32 {
        self.0
    }
}

impl Default for DayCount {
    fn default() -> Self {
        Self(DEFAULT_PHASE_DAYS)
    }
}

impl TryFrom<i64> for DayCount {
    type Error = PhaseValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DayCount> for i32 {
    fn from(value: DayCount) -> Self {
        value.0
    }
}

fn validated_name(name: &str) -> Result<String, PhaseValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(PhaseValidationError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

/// A stage in the transport journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: PhaseId,
    pub name: String,
    pub description: Option<String>,
    pub order: i32,
    pub default_days_to_complete: DayCount,
    pub color: String,
    pub icon_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Phase {
    /// Materialise a draft at the given catalogue position.
    #[must_use]
    pub fn from_draft(draft: PhaseDraft, order: i32, now: DateTime<Utc>) -> Self {
        Self {
            id: PhaseId::random(),
            name: draft.name,
            description: draft.description,
            order,
            default_days_to_complete: draft.default_days_to_complete,
            color: draft.color,
            icon_name: draft.icon_name,
            created_at: now,
            updated_at: now,
        }
    }

    /// Return a copy with the provided fields replaced.
    #[must_use]
    pub fn apply(mut self, update: PhaseUpdate, now: DateTime<Utc>) -> Self {
        let PhaseUpdate {
            name,
            description,
            default_days_to_complete,
            color,
            icon_name,
            order,
        } = update;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = Some(description);
        }
        if let Some(days) = default_days_to_complete {
            self.default_days_to_complete = days;
        }
        if let Some(color) = color {
            self.color = color;
        }
        if let Some(icon_name) = icon_name {
            self.icon_name = icon_name;
        }
        if let Some(order) = order {
            self.order = order;
        }
        self.updated_at = now;
        self
    }
}

/// Validated input for a new phase; defaults fill absent display fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseDraft {
    name: String,
    description: Option<String>,
    default_days_to_complete: DayCount,
    color: String,
    icon_name: String,
}

impl PhaseDraft {
    /// Start a draft with the given name and default display settings.
    pub fn new(name: &str) -> Result<Self, PhaseValidationError> {
        Ok(Self {
            name: validated_name(name)?,
            description: None,
            default_days_to_complete: DayCount::default(),
            color: DEFAULT_PHASE_COLOR.to_owned(),
            icon_name: DEFAULT_PHASE_ICON.to_owned(),
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    #[must_use]
    pub fn with_default_days(mut self, days: DayCount) -> Self {
        self.default_days_to_complete = days;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    #[must_use]
    pub fn with_icon_name(mut self, icon_name: impl Into<String>) -> Self {
        self.icon_name = icon_name.into();
        self
    }

    /// Draft name after trimming.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Partial update for an existing phase. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseUpdate {
    name: Option<String>,
    description: Option<String>,
    default_days_to_complete: Option<DayCount>,
    color: Option<String>,
    icon_name: Option<String>,
    order: Option<i32>,
}

impl PhaseUpdate {
    /// Replace the name, rejecting blank values.
    pub fn name(mut self, name: &str) -> Result<Self, PhaseValidationError> {
        self.name = Some(validated_name(name)?);
        Ok(self)
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn default_days(mut self, days: DayCount) -> Self {
        self.default_days_to_complete = Some(days);
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn icon_name(mut self, icon_name: impl Into<String>) -> Self {
        self.icon_name = Some(icon_name.into());
        self
    }

    #[must_use]
    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }
}

/// Order phases by catalogue position, breaking ties by creation time and id.
pub fn sort_catalogue(phases: &mut [Phase]) {
    phases.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
}

struct DefaultPhase {
    name: &'static str,
    description: &'static str,
    days: i32,
    color: &'static str,
    icon: &'static str,
}

const DEFAULT_CATALOGUE: [DefaultPhase; 5] = [
    DefaultPhase {
        name: "Priprema",
        description: "Priprema dokumentacije i ugovora",
        days: 2,
        color: "#06b6d4",
        icon: "file-text",
    },
    DefaultPhase {
        name: "Preuzimanje",
        description: "Preuzimanje vozila sa lokacije",
        days: 3,
        color: "#8b5cf6",
        icon: "truck",
    },
    DefaultPhase {
        name: "Transport",
        description: "Transport vozila do destinacije",
        days: 5,
        color: "#10b981",
        icon: "truck",
    },
    DefaultPhase {
        name: "Carinjenje",
        description: "Carinska procedura",
        days: 2,
        color: "#f59e0b",
        icon: "shield",
    },
    DefaultPhase {
        name: "Dostava",
        description: "Dostava vozila kupcu",
        days: 2,
        color: "#ef4444",
        icon: "map-pin",
    },
];

/// The catalogue installed on an empty deployment, in order.
#[must_use]
pub fn default_catalogue() -> Vec<PhaseDraft> {
    DEFAULT_CATALOGUE
        .iter()
        .map(|entry| PhaseDraft {
            name: entry.name.to_owned(),
            description: Some(entry.description.to_owned()),
            default_days_to_complete: DayCount(entry.days),
            color: entry.color.to_owned(),
            icon_name: entry.icon.to_owned(),
        })
        .collect()
}
