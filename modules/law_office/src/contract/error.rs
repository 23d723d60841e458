use thiserror::Error;
use uuid::Uuid;

use crate::domain::error::{DomainError, EntityKind};

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LawOfficeError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: Uuid },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl LawOfficeError {
    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<DomainError> for LawOfficeError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { entity, id } => Self::not_found(entity, id),
            DomainError::Validation { .. }
            | DomainError::EmailAlreadyExists { .. }
            | DomainError::UnknownReference { .. } => Self::validation(e.to_string()),
            DomainError::Database { .. } => Self::Internal,
        }
    }
}
