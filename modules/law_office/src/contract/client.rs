use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{
    error::LawOfficeError,
    model::{
        Appointment, AppointmentPatch, AppointmentView, Case, CasePatch, CaseView, Client,
        ClientPatch, NewAppointment, NewCase, NewClient,
    },
};

/// In-process API of the law office module.
///
/// Updates return `Ok(None)` when the id is unknown; deletes of unknown ids succeed.
#[async_trait]
pub trait LawOfficeApi: Send + Sync {
    async fn list_clients(&self) -> Result<Vec<Client>, LawOfficeError>;
    async fn get_client(&self, id: Uuid) -> Result<Client, LawOfficeError>;
    async fn create_client(&self, new: NewClient) -> Result<Client, LawOfficeError>;
    async fn update_client(
        &self,
        id: Uuid,
        patch: ClientPatch,
    ) -> Result<Option<Client>, LawOfficeError>;
    async fn delete_client(&self, id: Uuid) -> Result<(), LawOfficeError>;

    async fn list_cases(&self) -> Result<Vec<CaseView>, LawOfficeError>;
    async fn get_case(&self, id: Uuid) -> Result<CaseView, LawOfficeError>;
    async fn create_case(&self, new: NewCase) -> Result<Case, LawOfficeError>;
    async fn update_case(&self, id: Uuid, patch: CasePatch)
        -> Result<Option<Case>, LawOfficeError>;
    async fn delete_case(&self, id: Uuid) -> Result<(), LawOfficeError>;

    async fn list_appointments(&self) -> Result<Vec<AppointmentView>, LawOfficeError>;
    async fn get_appointment(&self, id: Uuid) -> Result<AppointmentView, LawOfficeError>;
    async fn create_appointment(&self, new: NewAppointment)
        -> Result<Appointment, LawOfficeError>;
    async fn update_appointment(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Option<Appointment>, LawOfficeError>;
    async fn delete_appointment(&self, id: Uuid) -> Result<(), LawOfficeError>;
}
