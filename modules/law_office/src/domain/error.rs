use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Which registry an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Client,
    Case,
    Appointment,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Client => "Client",
            EntityKind::Case => "Case",
            EntityKind::Appointment => "Appointment",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: Uuid },

    #[error("Client with email '{email}' already exists")]
    EmailAlreadyExists { email: String },

    #[error("{field} references unknown {entity} {id}")]
    UnknownReference {
        field: &'static str,
        entity: EntityKind,
        id: Uuid,
    },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn unknown_reference(field: &'static str, entity: EntityKind, id: Uuid) -> Self {
        Self::UnknownReference { field, entity, id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<crate::domain::repo::RepoError> for DomainError {
    fn from(e: crate::domain::repo::RepoError) -> Self {
        // Unique violations are resolved by the caller; reaching here means a store fault.
        Self::database(format!("{e:#}"))
    }
}
