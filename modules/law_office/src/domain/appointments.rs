use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{
    Appointment, AppointmentPatch, AppointmentView, CaseSummary, NewAppointment, Reference,
    DEFAULT_APPOINTMENT_DURATION,
};
use crate::domain::cases::{client_reference, client_summaries};
use crate::domain::error::{DomainError, EntityKind};
use crate::domain::repo::{AppointmentsRepository, CasesRepository, ClientsRepository};
use crate::domain::{now, optional, patch_optional, required, stored, RegistryConfig};

/// Appointment registry. Reads join in the client's name and the case title/number.
#[derive(Clone)]
pub struct AppointmentRegistry {
    appointments: Arc<dyn AppointmentsRepository>,
    clients: Arc<dyn ClientsRepository>,
    cases: Arc<dyn CasesRepository>,
    config: RegistryConfig,
}

fn db(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}

fn validate_duration(duration: i32) -> Result<i32, DomainError> {
    if duration <= 0 {
        return Err(DomainError::validation(
            "duration",
            "must be a positive number of minutes",
        ));
    }
    Ok(duration)
}

impl AppointmentRegistry {
    pub fn new(
        appointments: Arc<dyn AppointmentsRepository>,
        clients: Arc<dyn ClientsRepository>,
        cases: Arc<dyn CasesRepository>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            appointments,
            clients,
            cases,
            config,
        }
    }

    async fn case_summaries(
        &self,
        ids: impl IntoIterator<Item = Uuid>,
    ) -> Result<HashMap<Uuid, CaseSummary>, DomainError> {
        let ids: Vec<Uuid> = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let found = self.cases.find_by_ids(&ids).await.map_err(db)?;
        Ok(found.iter().map(|c| (c.id, CaseSummary::from(c))).collect())
    }

    async fn populate(
        &self,
        appointments: Vec<Appointment>,
    ) -> Result<Vec<AppointmentView>, DomainError> {
        let clients =
            client_summaries(self.clients.as_ref(), appointments.iter().map(|a| a.client_id))
                .await?;
        let cases = self
            .case_summaries(appointments.iter().filter_map(|a| a.case_id))
            .await?;

        Ok(appointments
            .into_iter()
            .map(|appointment| AppointmentView {
                client: client_reference(&clients, appointment.client_id),
                case: appointment.case_id.map(|id| match cases.get(&id) {
                    Some(s) => Reference::Populated(s.clone()),
                    None => Reference::Orphan(id),
                }),
                appointment,
            })
            .collect())
    }

    #[instrument(name = "law_office.appointments.list", skip(self))]
    pub async fn list(&self) -> Result<Vec<AppointmentView>, DomainError> {
        let appointments = self.appointments.list().await.map_err(db)?;
        debug!(count = appointments.len(), "Listed appointments");
        self.populate(appointments).await
    }

    #[instrument(name = "law_office.appointments.get", skip(self), fields(appointment_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<AppointmentView, DomainError> {
        let appointment = self
            .appointments
            .find_by_id(id)
            .await
            .map_err(db)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Appointment, id))?;
        let mut views = self.populate(vec![appointment]).await?;
        views
            .pop()
            .ok_or_else(|| DomainError::not_found(EntityKind::Appointment, id))
    }

    #[instrument(
        name = "law_office.appointments.create",
        skip(self, new),
        fields(client_id = %new.client_id, at = %new.appointment_date)
    )]
    pub async fn create(&self, new: NewAppointment) -> Result<Appointment, DomainError> {
        let title = required("title", new.title)?;
        let duration = validate_duration(new.duration.unwrap_or(DEFAULT_APPOINTMENT_DURATION))?;
        self.check_references(Some(new.client_id), new.case_id).await?;

        let now = now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            client_id: new.client_id,
            case_id: new.case_id,
            title,
            description: optional(new.description),
            appointment_date: stored(new.appointment_date),
            duration,
            status: new.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        self.appointments.insert(appointment.clone()).await?;
        info!(appointment_id = %appointment.id, "Created appointment");
        Ok(appointment)
    }

    /// Partial overwrite. Unknown id yields `Ok(None)`.
    #[instrument(
        name = "law_office.appointments.update",
        skip(self, patch),
        fields(appointment_id = %id)
    )]
    pub async fn update(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Option<Appointment>, DomainError> {
        let Some(mut current) = self.appointments.find_by_id(id).await.map_err(db)? else {
            debug!("Update of unknown appointment ignored");
            return Ok(None);
        };

        let new_client = patch.client_id.filter(|c| *c != current.client_id);
        let new_case = patch.case_id.flatten().filter(|c| Some(*c) != current.case_id);
        self.check_references(new_client, new_case).await?;

        if let Some(client_id) = patch.client_id {
            current.client_id = client_id;
        }
        if let Some(case_id) = patch.case_id {
            current.case_id = case_id;
        }
        if let Some(title) = patch.title {
            current.title = required("title", title)?;
        }
        patch_optional(&mut current.description, patch.description);
        if let Some(date) = patch.appointment_date {
            current.appointment_date = stored(date);
        }
        if let Some(duration) = patch.duration {
            current.duration = validate_duration(duration)?;
        }
        if let Some(status) = patch.status {
            current.status = status;
        }
        current.updated_at = now();

        if !self.appointments.update(current.clone()).await? {
            return Ok(None);
        }
        info!("Updated appointment");
        Ok(Some(current))
    }

    /// Hard delete; unknown ids succeed.
    #[instrument(name = "law_office.appointments.delete", skip(self), fields(appointment_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = self.appointments.delete(id).await.map_err(db)?;
        info!(deleted, "Deleted appointment");
        Ok(())
    }

    async fn check_references(
        &self,
        client_id: Option<Uuid>,
        case_id: Option<Uuid>,
    ) -> Result<(), DomainError> {
        if !self.config.enforce_references {
            return Ok(());
        }
        if let Some(id) = client_id {
            if self.clients.find_by_id(id).await.map_err(db)?.is_none() {
                return Err(DomainError::unknown_reference("clientId", EntityKind::Client, id));
            }
        }
        if let Some(id) = case_id {
            if self.cases.find_by_id(id).await.map_err(db)?.is_none() {
                return Err(DomainError::unknown_reference("caseId", EntityKind::Case, id));
            }
        }
        Ok(())
    }
}
