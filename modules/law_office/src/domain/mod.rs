pub mod appointments;
pub mod cases;
pub mod clients;
pub mod error;
pub mod repo;

pub use appointments::AppointmentRegistry;
pub use cases::CaseRegistry;
pub use clients::ClientRegistry;

use chrono::{DateTime, SubsecRound, Utc};

/// Behavior switches shared by the registries.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryConfig {
    /// Reject writes whose `client_id`/`case_id` point at no record.
    pub enforce_references: bool,
}

/// Trim a required field; blank becomes a validation error.
pub(crate) fn required(field: &str, value: String) -> Result<String, error::DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(error::DomainError::validation(field, "is required"));
    }
    Ok(trimmed.to_string())
}

/// Blank optional strings are stored as absent.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Apply an optional-field patch: `None` keeps, blank clears, anything else replaces.
pub(crate) fn patch_optional(current: &mut Option<String>, patch: Option<String>) {
    if let Some(v) = patch {
        *current = optional(Some(v));
    }
}

/// Timestamps are kept at microsecond precision, the finest Postgres stores,
/// so a record handed back from a write equals the one read back later.
pub(crate) fn stored(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}

pub(crate) fn now() -> DateTime<Utc> {
    stored(Utc::now())
}
