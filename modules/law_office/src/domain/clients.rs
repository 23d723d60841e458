use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{Client, ClientPatch, NewClient};
use crate::domain::error::{DomainError, EntityKind};
use crate::domain::repo::{ClientsRepository, RepoError};
use crate::domain::{now, optional, patch_optional, required};

/// Client registry: CRUD with email uniqueness.
/// Depends only on the repository port, not on infra types.
#[derive(Clone)]
pub struct ClientRegistry {
    repo: Arc<dyn ClientsRepository>,
}

impl ClientRegistry {
    pub fn new(repo: Arc<dyn ClientsRepository>) -> Self {
        Self { repo }
    }

    #[instrument(name = "law_office.clients.list", skip(self))]
    pub async fn list(&self) -> Result<Vec<Client>, DomainError> {
        let clients = self
            .repo
            .list()
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;
        debug!(count = clients.len(), "Listed clients");
        Ok(clients)
    }

    #[instrument(name = "law_office.clients.get", skip(self), fields(client_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Client, DomainError> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?
            .ok_or_else(|| DomainError::not_found(EntityKind::Client, id))
    }

    #[instrument(name = "law_office.clients.create", skip(self, new), fields(email = %new.email))]
    pub async fn create(&self, new: NewClient) -> Result<Client, DomainError> {
        let first_name = required("firstName", new.first_name)?;
        let last_name = required("lastName", new.last_name)?;
        let email = required("email", new.email)?;

        self.ensure_email_free(&email, None).await?;

        let now = now();
        let client = Client {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            email,
            phone: optional(new.phone),
            address: optional(new.address),
            created_at: now,
            updated_at: now,
        };

        self.repo
            .insert(client.clone())
            .await
            .map_err(|e| Self::map_write_error(e, &client.email))?;

        info!(client_id = %client.id, "Created client");
        Ok(client)
    }

    /// Partial overwrite. Unknown id yields `Ok(None)`.
    #[instrument(name = "law_office.clients.update", skip(self, patch), fields(client_id = %id))]
    pub async fn update(&self, id: Uuid, patch: ClientPatch) -> Result<Option<Client>, DomainError> {
        let Some(mut current) = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?
        else {
            debug!("Update of unknown client ignored");
            return Ok(None);
        };

        if let Some(first_name) = patch.first_name {
            current.first_name = required("firstName", first_name)?;
        }
        if let Some(last_name) = patch.last_name {
            current.last_name = required("lastName", last_name)?;
        }
        if let Some(email) = patch.email {
            let email = required("email", email)?;
            if email != current.email {
                self.ensure_email_free(&email, Some(id)).await?;
            }
            current.email = email;
        }
        patch_optional(&mut current.phone, patch.phone);
        patch_optional(&mut current.address, patch.address);
        current.updated_at = now();

        let found = self
            .repo
            .update(current.clone())
            .await
            .map_err(|e| Self::map_write_error(e, &current.email))?;
        if !found {
            return Ok(None);
        }

        info!("Updated client");
        Ok(Some(current))
    }

    /// Hard delete without cascade; unknown ids succeed.
    #[instrument(name = "law_office.clients.delete", skip(self), fields(client_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;
        info!(deleted, "Deleted client");
        Ok(())
    }

    async fn ensure_email_free(&self, email: &str, except: Option<Uuid>) -> Result<(), DomainError> {
        let taken = self
            .repo
            .email_exists(email, except)
            .await
            .map_err(|e| DomainError::database(format!("{e:#}")))?;
        if taken {
            return Err(DomainError::email_already_exists(email));
        }
        Ok(())
    }

    // A concurrent writer can win the race past the pre-check; the index has the last word.
    fn map_write_error(e: RepoError, email: &str) -> DomainError {
        match e {
            RepoError::UniqueViolation => DomainError::email_already_exists(email),
            other => other.into(),
        }
    }
}
