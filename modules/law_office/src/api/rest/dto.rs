//! Wire types for the `/api` routes: camelCase JSON with serde, described with utoipa.
//!
//! Server-owned fields (`id`, `createdAt`, `updatedAt`) are absent from the request
//! types, so a body that carries them still parses and the values are dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{
    Appointment, AppointmentPatch, AppointmentStatus, AppointmentView, Case, CasePatch,
    CasePriority, CaseStatus, CaseSummary, CaseView, Client, ClientPatch, ClientSummary,
    NewAppointment, NewCase, NewClient, Reference,
};

/// Keeps an explicit `null` apart from an absent field: absent stays `None` through
/// `#[serde(default)]`, `null` becomes `Some(None)`.
fn nullable<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

// Closed enums mirrored for transport; serde rejects anything outside the set.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $dto:ident <=> $model:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "lowercase")]
        pub enum $dto {
            $($variant),+
        }

        impl From<$model> for $dto {
            fn from(v: $model) -> Self {
                match v {
                    $($model::$variant => $dto::$variant),+
                }
            }
        }

        impl From<$dto> for $model {
            fn from(v: $dto) -> Self {
                match v {
                    $($dto::$variant => $model::$variant),+
                }
            }
        }
    };
}

wire_enum!(
    /// Case lifecycle state.
    CaseStatusDto <=> CaseStatus { Open, Pending, Closed, Archived }
);
wire_enum!(
    CasePriorityDto <=> CasePriority { Low, Medium, High }
);
wire_enum!(
    AppointmentStatusDto <=> AppointmentStatus { Scheduled, Completed, Cancelled }
);

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientReq {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Partial update; absent fields are kept, `""` clears `phone`/`address`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientReq {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl From<Client> for ClientDto {
    fn from(c: Client) -> Self {
        Self {
            id: c.id,
            first_name: c.first_name,
            last_name: c.last_name,
            email: c.email,
            phone: c.phone,
            address: c.address,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<CreateClientReq> for NewClient {
    fn from(req: CreateClientReq) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            address: req.address,
        }
    }
}

impl From<UpdateClientReq> for ClientPatch {
    fn from(req: UpdateClientReq) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            address: req.address,
        }
    }
}

/// Client name fields joined into case and appointment reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummaryDto {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl From<ClientSummary> for ClientSummaryDto {
    fn from(s: ClientSummary) -> Self {
        Self {
            id: s.id,
            first_name: s.first_name,
            last_name: s.last_name,
        }
    }
}

/// Expanded `clientId`: the client's summary, or the bare id when the client is gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ClientRefDto {
    Populated(ClientSummaryDto),
    Orphan(Uuid),
}

impl From<Reference<ClientSummary>> for ClientRefDto {
    fn from(r: Reference<ClientSummary>) -> Self {
        match r {
            Reference::Populated(s) => Self::Populated(s.into()),
            Reference::Orphan(id) => Self::Orphan(id),
        }
    }
}

// ---------------------------------------------------------------------------
// Cases
// ---------------------------------------------------------------------------

/// Case as stored; returned by create and update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseDto {
    pub id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,
    pub status: CaseStatusDto,
    pub priority: CasePriorityDto,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Case with `clientId` expanded; returned by list and get.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseReadDto {
    pub id: Uuid,
    pub client_id: ClientRefDto,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,
    pub status: CaseStatusDto,
    pub priority: CasePriorityDto,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseReq {
    pub client_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub case_number: Option<String>,
    #[serde(default)]
    pub status: Option<CaseStatusDto>,
    #[serde(default)]
    pub priority: Option<CasePriorityDto>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub court_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaseReq {
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub case_number: Option<String>,
    #[serde(default)]
    pub status: Option<CaseStatusDto>,
    #[serde(default)]
    pub priority: Option<CasePriorityDto>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    /// `null` clears the court date.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub court_date: Option<Option<DateTime<Utc>>>,
}

impl From<Case> for CaseDto {
    fn from(c: Case) -> Self {
        Self {
            id: c.id,
            client_id: c.client_id,
            title: c.title,
            description: c.description,
            case_number: c.case_number,
            status: c.status.into(),
            priority: c.priority.into(),
            start_date: c.start_date,
            court_date: c.court_date,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<CaseView> for CaseReadDto {
    fn from(v: CaseView) -> Self {
        let c = v.case;
        Self {
            id: c.id,
            client_id: v.client.into(),
            title: c.title,
            description: c.description,
            case_number: c.case_number,
            status: c.status.into(),
            priority: c.priority.into(),
            start_date: c.start_date,
            court_date: c.court_date,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<CreateCaseReq> for NewCase {
    fn from(req: CreateCaseReq) -> Self {
        Self {
            client_id: req.client_id,
            title: req.title,
            description: req.description,
            case_number: req.case_number,
            status: req.status.map(Into::into),
            priority: req.priority.map(Into::into),
            start_date: req.start_date,
            court_date: req.court_date,
        }
    }
}

impl From<UpdateCaseReq> for CasePatch {
    fn from(req: UpdateCaseReq) -> Self {
        Self {
            client_id: req.client_id,
            title: req.title,
            description: req.description,
            case_number: req.case_number,
            status: req.status.map(Into::into),
            priority: req.priority.map(Into::into),
            start_date: req.start_date,
            court_date: req.court_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummaryDto {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_number: Option<String>,
}

impl From<CaseSummary> for CaseSummaryDto {
    fn from(s: CaseSummary) -> Self {
        Self {
            id: s.id,
            title: s.title,
            case_number: s.case_number,
        }
    }
}

/// Expanded `caseId`: the case's title and number, or the bare id for a deleted case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CaseRefDto {
    Populated(CaseSummaryDto),
    Orphan(Uuid),
}

impl From<Reference<CaseSummary>> for CaseRefDto {
    fn from(r: Reference<CaseSummary>) -> Self {
        match r {
            Reference::Populated(s) => Self::Populated(s.into()),
            Reference::Orphan(id) => Self::Orphan(id),
        }
    }
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDto {
    pub id: Uuid,
    pub client_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<Uuid>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub appointment_date: DateTime<Utc>,
    /// Minutes.
    pub duration: i32,
    pub status: AppointmentStatusDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Appointment with `clientId` and `caseId` expanded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentReadDto {
    pub id: Uuid,
    pub client_id: ClientRefDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<CaseRefDto>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub appointment_date: DateTime<Utc>,
    pub duration: i32,
    pub status: AppointmentStatusDto,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentReq {
    pub client_id: Uuid,
    #[serde(default)]
    pub case_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub appointment_date: DateTime<Utc>,
    /// Minutes; 60 when omitted.
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub status: Option<AppointmentStatusDto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentReq {
    #[serde(default)]
    pub client_id: Option<Uuid>,
    /// `null` detaches the appointment from its case.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub case_id: Option<Option<Uuid>>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub appointment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub status: Option<AppointmentStatusDto>,
}

impl From<Appointment> for AppointmentDto {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            client_id: a.client_id,
            case_id: a.case_id,
            title: a.title,
            description: a.description,
            appointment_date: a.appointment_date,
            duration: a.duration,
            status: a.status.into(),
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

impl From<AppointmentView> for AppointmentReadDto {
    fn from(v: AppointmentView) -> Self {
        let a = v.appointment;
        Self {
            id: a.id,
            client_id: v.client.into(),
            case_id: v.case.map(Into::into),
            title: a.title,
            description: a.description,
            appointment_date: a.appointment_date,
            duration: a.duration,
            status: a.status.into(),
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

impl From<CreateAppointmentReq> for NewAppointment {
    fn from(req: CreateAppointmentReq) -> Self {
        Self {
            client_id: req.client_id,
            case_id: req.case_id,
            title: req.title,
            description: req.description,
            appointment_date: req.appointment_date,
            duration: req.duration,
            status: req.status.map(Into::into),
        }
    }
}

impl From<UpdateAppointmentReq> for AppointmentPatch {
    fn from(req: UpdateAppointmentReq) -> Self {
        Self {
            client_id: req.client_id,
            case_id: req.case_id,
            title: req.title,
            description: req.description,
            appointment_date: req.appointment_date,
            duration: req.duration,
            status: req.status.map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn update_body_tells_null_from_absent() {
        let absent: UpdateCaseReq = serde_json::from_value(json!({"title": "X"})).unwrap();
        assert_eq!(CasePatch::from(absent).court_date, None);

        let cleared: UpdateCaseReq = serde_json::from_value(json!({"courtDate": null})).unwrap();
        assert_eq!(CasePatch::from(cleared).court_date, Some(None));

        let set: UpdateCaseReq =
            serde_json::from_value(json!({"courtDate": "2024-05-01T09:00:00Z"})).unwrap();
        assert_eq!(CasePatch::from(set).court_date, Some(Some(at(9))));

        let detached: UpdateAppointmentReq =
            serde_json::from_value(json!({"caseId": null})).unwrap();
        assert_eq!(AppointmentPatch::from(detached).case_id, Some(None));
        let untouched: UpdateAppointmentReq = serde_json::from_value(json!({})).unwrap();
        assert_eq!(AppointmentPatch::from(untouched).case_id, None);
    }

    #[test]
    fn client_serializes_camel_case_and_omits_absent_optionals() {
        let dto = ClientDto::from(Client {
            id: Uuid::nil(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@example.com".into(),
            phone: None,
            address: Some("1 Main St".into()),
            created_at: at(9),
            updated_at: at(9),
        });
        let v = serde_json::to_value(&dto).unwrap();
        assert_eq!(v["firstName"], "John");
        assert_eq!(v["address"], "1 Main St");
        assert!(v.get("phone").is_none());
        assert!(v.get("createdAt").is_some());
    }

    #[test]
    fn create_body_ignores_server_owned_fields() {
        let req: CreateClientReq = serde_json::from_value(json!({
            "id": "not-even-a-uuid",
            "createdAt": "yesterday",
            "firstName": "Jane",
            "lastName": "Roe",
            "email": "jane@example.com"
        }))
        .unwrap();
        assert_eq!(req.first_name, "Jane");
        assert_eq!(req.phone, None);
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        let res = serde_json::from_value::<CreateCaseReq>(json!({
            "clientId": Uuid::nil(),
            "title": "Property Dispute",
            "status": "reopened"
        }));
        assert!(res.is_err());

        let res = serde_json::from_value::<UpdateAppointmentReq>(json!({"status": "Scheduled"}));
        assert!(res.is_err());
    }

    #[test]
    fn references_expand_or_stay_raw() {
        let id = Uuid::new_v4();
        let populated = ClientRefDto::from(Reference::Populated(ClientSummary {
            id,
            first_name: "John".into(),
            last_name: "Doe".into(),
        }));
        assert_eq!(
            serde_json::to_value(&populated).unwrap(),
            json!({"id": id, "firstName": "John", "lastName": "Doe"})
        );

        let orphan = CaseRefDto::from(Reference::<CaseSummary>::Orphan(id));
        assert_eq!(serde_json::to_value(&orphan).unwrap(), json!(id));
    }

    #[test]
    fn enum_wire_names_are_lowercase() {
        assert_eq!(
            serde_json::to_value(CaseStatusDto::from(CaseStatus::Archived)).unwrap(),
            json!("archived")
        );
        let p: CasePriorityDto = serde_json::from_value(json!("high")).unwrap();
        assert_eq!(CasePriority::from(p), CasePriority::High);
    }
}
