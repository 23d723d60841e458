use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::LawOfficeApi,
    error::LawOfficeError,
    model::{
        Appointment, AppointmentPatch, AppointmentView, Case, CasePatch, CaseView, Client,
        ClientPatch, NewAppointment, NewCase, NewClient,
    },
};
use crate::domain::{AppointmentRegistry, CaseRegistry, ClientRegistry};

/// Local implementation of the LawOfficeApi trait that delegates to the registries
pub struct LawOfficeLocalClient {
    clients: Arc<ClientRegistry>,
    cases: Arc<CaseRegistry>,
    appointments: Arc<AppointmentRegistry>,
}

impl LawOfficeLocalClient {
    pub fn new(
        clients: Arc<ClientRegistry>,
        cases: Arc<CaseRegistry>,
        appointments: Arc<AppointmentRegistry>,
    ) -> Self {
        Self {
            clients,
            cases,
            appointments,
        }
    }
}

#[async_trait]
impl LawOfficeApi for LawOfficeLocalClient {
    async fn list_clients(&self) -> Result<Vec<Client>, LawOfficeError> {
        self.clients.list().await.map_err(Into::into)
    }

    async fn get_client(&self, id: Uuid) -> Result<Client, LawOfficeError> {
        self.clients.get(id).await.map_err(Into::into)
    }

    async fn create_client(&self, new: NewClient) -> Result<Client, LawOfficeError> {
        self.clients.create(new).await.map_err(Into::into)
    }

    async fn update_client(
        &self,
        id: Uuid,
        patch: ClientPatch,
    ) -> Result<Option<Client>, LawOfficeError> {
        self.clients.update(id, patch).await.map_err(Into::into)
    }

    async fn delete_client(&self, id: Uuid) -> Result<(), LawOfficeError> {
        self.clients.delete(id).await.map_err(Into::into)
    }

    async fn list_cases(&self) -> Result<Vec<CaseView>, LawOfficeError> {
        self.cases.list().await.map_err(Into::into)
    }

    async fn get_case(&self, id: Uuid) -> Result<CaseView, LawOfficeError> {
        self.cases.get(id).await.map_err(Into::into)
    }

    async fn create_case(&self, new: NewCase) -> Result<Case, LawOfficeError> {
        self.cases.create(new).await.map_err(Into::into)
    }

    async fn update_case(
        &self,
        id: Uuid,
        patch: CasePatch,
    ) -> Result<Option<Case>, LawOfficeError> {
        self.cases.update(id, patch).await.map_err(Into::into)
    }

    async fn delete_case(&self, id: Uuid) -> Result<(), LawOfficeError> {
        self.cases.delete(id).await.map_err(Into::into)
    }

    async fn list_appointments(&self) -> Result<Vec<AppointmentView>, LawOfficeError> {
        self.appointments.list().await.map_err(Into::into)
    }

    async fn get_appointment(&self, id: Uuid) -> Result<AppointmentView, LawOfficeError> {
        self.appointments.get(id).await.map_err(Into::into)
    }

    async fn create_appointment(
        &self,
        new: NewAppointment,
    ) -> Result<Appointment, LawOfficeError> {
        self.appointments.create(new).await.map_err(Into::into)
    }

    async fn update_appointment(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Option<Appointment>, LawOfficeError> {
        self.appointments.update(id, patch).await.map_err(Into::into)
    }

    async fn delete_appointment(&self, id: Uuid) -> Result<(), LawOfficeError> {
        self.appointments.delete(id).await.map_err(Into::into)
    }
}
