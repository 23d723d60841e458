//! Pure domain records shared between the registries, the REST layer and
//! in-process consumers. No serde here; transport types live in `api::rest::dto`.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error returned when a stored or submitted value is outside a closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! closed_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $s),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

closed_enum!(
    /// Lifecycle state of a case. Defaults to `Open`.
    CaseStatus, "case status", {
        Open => "open",
        Pending => "pending",
        Closed => "closed",
        Archived => "archived",
    }
);

closed_enum!(
    CasePriority, "case priority", {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);

closed_enum!(
    AppointmentStatus, "appointment status", {
        Scheduled => "scheduled",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

impl Default for CaseStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl Default for CasePriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

/// Default appointment length in minutes.
pub const DEFAULT_APPOINTMENT_DURATION: i32 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial update. `None` keeps the stored value; a blank string clears an optional field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub case_number: Option<String>,
    pub status: CaseStatus,
    pub priority: CasePriority,
    pub start_date: DateTime<Utc>,
    pub court_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCase {
    pub client_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub case_number: Option<String>,
    pub status: Option<CaseStatus>,
    pub priority: Option<CasePriority>,
    /// Defaults to the creation time.
    pub start_date: Option<DateTime<Utc>>,
    pub court_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CasePatch {
    pub client_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub case_number: Option<String>,
    pub status: Option<CaseStatus>,
    pub priority: Option<CasePriority>,
    pub start_date: Option<DateTime<Utc>>,
    /// `Some(None)` clears the court date.
    pub court_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub case_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub appointment_date: DateTime<Utc>,
    /// Minutes.
    pub duration: i32,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub client_id: Uuid,
    pub case_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub appointment_date: DateTime<Utc>,
    pub duration: Option<i32>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppointmentPatch {
    pub client_id: Option<Uuid>,
    /// `Some(None)` detaches the appointment from its case.
    pub case_id: Option<Option<Uuid>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub appointment_date: Option<DateTime<Utc>>,
    pub duration: Option<i32>,
    pub status: Option<AppointmentStatus>,
}

/// Name fields of a client, joined into case and appointment reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Client> for ClientSummary {
    fn from(c: &Client) -> Self {
        Self {
            id: c.id,
            first_name: c.first_name.clone(),
            last_name: c.last_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSummary {
    pub id: Uuid,
    pub title: String,
    pub case_number: Option<String>,
}

impl From<&Case> for CaseSummary {
    fn from(c: &Case) -> Self {
        Self {
            id: c.id,
            title: c.title.clone(),
            case_number: c.case_number.clone(),
        }
    }
}

/// A foreign key after the read-side lookup: either the referenced record's
/// summary or, for an orphan, the raw identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference<T> {
    Populated(T),
    Orphan(Uuid),
}

impl<T> Reference<T> {
    pub fn populated(&self) -> Option<&T> {
        match self {
            Reference::Populated(t) => Some(t),
            Reference::Orphan(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseView {
    pub case: Case,
    pub client: Reference<ClientSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentView {
    pub appointment: Appointment,
    pub client: Reference<ClientSummary>,
    pub case: Option<Reference<CaseSummary>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_parse_their_wire_names() {
        for s in CaseStatus::ALL {
            assert_eq!(s.as_str().parse::<CaseStatus>().unwrap(), *s);
        }
        assert_eq!("high".parse::<CasePriority>().unwrap(), CasePriority::High);
        assert_eq!(
            "cancelled".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Cancelled
        );
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let err = "reopened".parse::<CaseStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown case status 'reopened'");
        assert!("Open".parse::<CaseStatus>().is_err());
    }

    #[test]
    fn defaults_match_new_record_values() {
        assert_eq!(CaseStatus::default(), CaseStatus::Open);
        assert_eq!(CasePriority::default(), CasePriority::Medium);
        assert_eq!(AppointmentStatus::default(), AppointmentStatus::Scheduled);
    }
}
