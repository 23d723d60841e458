//! Persistence ports for the registries. Object-safe and async-friendly via
//! `async_trait`, so tests can swap in fakes.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::contract::model::{Appointment, Case, Client};

#[derive(Debug, Error)]
pub enum RepoError {
    /// A unique index rejected the write (only `clients.email` has one).
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait ClientsRepository: Send + Sync {
    /// All clients, newest created first.
    async fn list(&self) -> anyhow::Result<Vec<Client>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Client>>;
    /// Batch lookup for read-side population; unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Client>>;
    /// Whether another client (not `except`) already uses `email`.
    async fn email_exists(&self, email: &str, except: Option<Uuid>) -> anyhow::Result<bool>;
    async fn insert(&self, c: Client) -> Result<(), RepoError>;
    /// Overwrite by primary key. Returns false when the row is gone.
    async fn update(&self, c: Client) -> Result<bool, RepoError>;
    /// Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait CasesRepository: Send + Sync {
    /// All cases, newest created first.
    async fn list(&self) -> anyhow::Result<Vec<Case>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Case>>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Case>>;
    async fn insert(&self, c: Case) -> Result<(), RepoError>;
    async fn update(&self, c: Case) -> Result<bool, RepoError>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait AppointmentsRepository: Send + Sync {
    /// All appointments, earliest appointment date first.
    async fn list(&self) -> anyhow::Result<Vec<Appointment>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Appointment>>;
    async fn insert(&self, a: Appointment) -> Result<(), RepoError>;
    async fn update(&self, a: Appointment) -> Result<bool, RepoError>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
