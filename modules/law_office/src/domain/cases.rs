use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{Case, CasePatch, CaseView, ClientSummary, NewCase, Reference};
use crate::domain::error::{DomainError, EntityKind};
use crate::domain::repo::{CasesRepository, ClientsRepository};
use crate::domain::{now, optional, patch_optional, required, stored, RegistryConfig};

/// Case registry. Reads join in the owning client's name.
#[derive(Clone)]
pub struct CaseRegistry {
    cases: Arc<dyn CasesRepository>,
    clients: Arc<dyn ClientsRepository>,
    config: RegistryConfig,
}

fn db(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

/// Look up client summaries for a set of ids in one round trip.
pub(crate) async fn client_summaries(
    clients: &dyn ClientsRepository,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<HashMap<Uuid, ClientSummary>, DomainError> {
    let ids: Vec<Uuid> = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let found = clients.find_by_ids(&ids).await.map_err(db)?;
    Ok(found.iter().map(|c| (c.id, ClientSummary::from(c))).collect())
}

pub(crate) fn client_reference(
    summaries: &HashMap<Uuid, ClientSummary>,
    id: Uuid,
) -> Reference<ClientSummary> {
    match summaries.get(&id) {
        Some(s) => Reference::Populated(s.clone()),
        None => Reference::Orphan(id),
    }
}

impl CaseRegistry {
    pub fn new(
        cases: Arc<dyn CasesRepository>,
        clients: Arc<dyn ClientsRepository>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            cases,
            clients,
            config,
        }
    }

    #[instrument(name = "law_office.cases.list", skip(self))]
    pub async fn list(&self) -> Result<Vec<CaseView>, DomainError> {
        let cases = self.cases.list().await.map_err(db)?;
        let summaries = client_summaries(self.clients.as_ref(), cases.iter().map(|c| c.client_id)).await?;
        debug!(count = cases.len(), clients = summaries.len(), "Listed cases");
        Ok(cases
            .into_iter()
            .map(|case| CaseView {
                client: client_reference(&summaries, case.client_id),
                case,
            })
            .collect())
    }

    #[instrument(name = "law_office.cases.get", skip(self), fields(case_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<CaseView, DomainError> {
        let case = self
            .cases
            .find_by_id(id)
            .await
            .map_err(db)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Case, id))?;
        let summaries = client_summaries(self.clients.as_ref(), [case.client_id]).await?;
        Ok(CaseView {
            client: client_reference(&summaries, case.client_id),
            case,
        })
    }

    #[instrument(name = "law_office.cases.create", skip(self, new), fields(client_id = %new.client_id))]
    pub async fn create(&self, new: NewCase) -> Result<Case, DomainError> {
        let title = required("title", new.title)?;
        self.check_client(new.client_id).await?;

        let now = now();
        let case = Case {
            id: Uuid::new_v4(),
            client_id: new.client_id,
            title,
            description: optional(new.description),
            case_number: optional(new.case_number),
            status: new.status.unwrap_or_default(),
            priority: new.priority.unwrap_or_default(),
            start_date: new.start_date.map(stored).unwrap_or(now),
            court_date: new.court_date.map(stored),
            created_at: now,
            updated_at: now,
        };

        self.cases.insert(case.clone()).await?;
        info!(case_id = %case.id, "Created case");
        Ok(case)
    }

    /// Partial overwrite. Unknown id yields `Ok(None)`.
    #[instrument(name = "law_office.cases.update", skip(self, patch), fields(case_id = %id))]
    pub async fn update(&self, id: Uuid, patch: CasePatch) -> Result<Option<Case>, DomainError> {
        let Some(mut current) = self.cases.find_by_id(id).await.map_err(db)? else {
            debug!("Update of unknown case ignored");
            return Ok(None);
        };

        if let Some(client_id) = patch.client_id {
            if client_id != current.client_id {
                self.check_client(client_id).await?;
            }
            current.client_id = client_id;
        }
        if let Some(title) = patch.title {
            current.title = required("title", title)?;
        }
        patch_optional(&mut current.description, patch.description);
        patch_optional(&mut current.case_number, patch.case_number);
        if let Some(status) = patch.status {
            current.status = status;
        }
        if let Some(priority) = patch.priority {
            current.priority = priority;
        }
        if let Some(start_date) = patch.start_date {
            current.start_date = stored(start_date);
        }
        if let Some(court_date) = patch.court_date {
            current.court_date = court_date.map(stored);
        }
        current.updated_at = now();

        if !self.cases.update(current.clone()).await? {
            return Ok(None);
        }
        info!("Updated case");
        Ok(Some(current))
    }

    /// Hard delete; appointments keep their `case_id`. Unknown ids succeed.
    #[instrument(name = "law_office.cases.delete", skip(self), fields(case_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = self.cases.delete(id).await.map_err(db)?;
        info!(deleted, "Deleted case");
        Ok(())
    }

    async fn check_client(&self, client_id: Uuid) -> Result<(), DomainError> {
        if !self.config.enforce_references {
            return Ok(());
        }
        if self.clients.find_by_id(client_id).await.map_err(db)?.is_none() {
            return Err(DomainError::unknown_reference(
                "clientId",
                EntityKind::Client,
                client_id,
            ));
        }
        Ok(())
    }
}
