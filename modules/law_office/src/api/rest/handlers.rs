use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::StatusCode,
    response::Json,
    Extension,
};
use modkit::api::problem::ProblemResponse;
use modkit::RequestMeta;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::rest::dto::{
    AppointmentDto, AppointmentReadDto, CaseDto, CaseReadDto, ClientDto, CreateAppointmentReq,
    CreateCaseReq, CreateClientReq, UpdateAppointmentReq, UpdateCaseReq, UpdateClientReq,
};
use crate::api::rest::error::{invalid_body, invalid_id, map_domain_error};
use crate::domain::{AppointmentRegistry, CaseRegistry, ClientRegistry};

type PathId = Result<Path<Uuid>, PathRejection>;
type Body<T> = Result<Json<T>, JsonRejection>;

fn path_id(id: PathId, meta: &RequestMeta) -> Result<Uuid, ProblemResponse> {
    id.map(|Path(id)| id).map_err(|r| {
        debug!(error = %r, "Rejected malformed id");
        invalid_id(&r, meta)
    })
}

fn body<T>(body: Body<T>, meta: &RequestMeta) -> Result<T, ProblemResponse> {
    body.map(|Json(b)| b).map_err(|r| {
        debug!(error = %r, "Rejected request body");
        invalid_body(&r, meta)
    })
}

// ---------------------------------------------------------------------------
// Clients
// ---------------------------------------------------------------------------

pub async fn list_clients(
    Extension(registry): Extension<Arc<ClientRegistry>>,
    meta: RequestMeta,
) -> Result<Json<Vec<ClientDto>>, ProblemResponse> {
    match registry.list().await {
        Ok(clients) => Ok(Json(clients.into_iter().map(ClientDto::from).collect())),
        Err(e) => {
            debug!("Failed to list clients: {}", e);
            Err(map_domain_error(&e, &meta))
        }
    }
}

/// Get a specific client by ID
pub async fn get_client(
    Extension(registry): Extension<Arc<ClientRegistry>>,
    meta: RequestMeta,
    id: PathId,
) -> Result<Json<ClientDto>, ProblemResponse> {
    let id = path_id(id, &meta)?;
    match registry.get(id).await {
        Ok(client) => Ok(Json(ClientDto::from(client))),
        Err(e) => {
            debug!("Failed to get client {}: {}", id, e);
            Err(map_domain_error(&e, &meta))
        }
    }
}

pub async fn create_client(
    Extension(registry): Extension<Arc<ClientRegistry>>,
    meta: RequestMeta,
    req: Body<CreateClientReq>,
) -> Result<(StatusCode, Json<ClientDto>), ProblemResponse> {
    let req = body(req, &meta)?;
    info!(email = %req.email, "Creating client");
    match registry.create(req.into()).await {
        Ok(client) => Ok((StatusCode::CREATED, Json(ClientDto::from(client)))),
        Err(e) => {
            debug!("Failed to create client: {}", e);
            Err(map_domain_error(&e, &meta))
        }
    }
}

/// Update an existing client; `null` when the id is unknown.
pub async fn update_client(
    Extension(registry): Extension<Arc<ClientRegistry>>,
    meta: RequestMeta,
    id: PathId,
    req: Body<UpdateClientReq>,
) -> Result<Json<Option<ClientDto>>, ProblemResponse> {
    let id = path_id(id, &meta)?;
    let req = body(req, &meta)?;
    match registry.update(id, req.into()).await {
        Ok(client) => Ok(Json(client.map(ClientDto::from))),
        Err(e) => {
            debug!("Failed to update client {}: {}", id, e);
            Err(map_domain_error(&e, &meta))
        }
    }
}

pub async fn delete_client(
    Extension(registry): Extension<Arc<ClientRegistry>>,
    meta: RequestMeta,
    id: PathId,
) -> Result<StatusCode, ProblemResponse> {
    let id = path_id(id, &meta)?;
    match registry.delete(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            debug!("Failed to delete client {}: {}", id, e);
            Err(map_domain_error(&e, &meta))
        }
    }
}

// ---------------------------------------------------------------------------
// Cases
// ---------------------------------------------------------------------------

pub async fn list_cases(
    Extension(registry): Extension<Arc<CaseRegistry>>,
    meta: RequestMeta,
) -> Result<Json<Vec<CaseReadDto>>, ProblemResponse> {
    match registry.list().await {
        Ok(cases) => Ok(Json(cases.into_iter().map(CaseReadDto::from).collect())),
        Err(e) => {
            debug!("Failed to list cases: {}", e);
            Err(map_domain_error(&e, &meta))
        }
    }
}

pub async fn get_case(
    Extension(registry): Extension<Arc<CaseRegistry>>,
    meta: RequestMeta,
    id: PathId,
) -> Result<Json<CaseReadDto>, ProblemResponse> {
    let id = path_id(id, &meta)?;
    match registry.get(id).await {
        Ok(view) => Ok(Json(CaseReadDto::from(view))),
        Err(e) => {
            debug!("Failed to get case {}: {}", id, e);
            Err(map_domain_error(&e, &meta))
        }
    }
}

pub async fn create_case(
    Extension(registry): Extension<Arc<CaseRegistry>>,
    meta: RequestMeta,
    req: Body<CreateCaseReq>,
) -> Result<(StatusCode, Json<CaseDto>), ProblemResponse> {
    let req = body(req, &meta)?;
    match registry.create(req.into()).await {
        Ok(case) => Ok((StatusCode::CREATED, Json(CaseDto::from(case)))),
        Err(e) => {
            debug!("Failed to create case: {}", e);
            Err(map_domain_error(&e, &meta))
        }
    }
}

pub async fn update_case(
    Extension(registry): Extension<Arc<CaseRegistry>>,
    meta: RequestMeta,
    id: PathId,
    req: Body<UpdateCaseReq>,
) -> Result<Json<Option<CaseDto>>, ProblemResponse> {
    let id = path_id(id, &meta)?;
    let req = body(req, &meta)?;
    match registry.update(id, req.into()).await {
        Ok(case) => Ok(Json(case.map(CaseDto::from))),
        Err(e) => {
            debug!("Failed to update case {}: {}", id, e);
            Err(map_domain_error(&e, &meta))
        }
    }
}

pub async fn delete_case(
    Extension(registry): Extension<Arc<CaseRegistry>>,
    meta: RequestMeta,
    id: PathId,
) -> Result<StatusCode, ProblemResponse> {
    let id = path_id(id, &meta)?;
    match registry.delete(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            debug!("Failed to delete case {}: {}", id, e);
            Err(map_domain_error(&e, &meta))
        }
    }
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

pub async fn list_appointments(
    Extension(registry): Extension<Arc<AppointmentRegistry>>,
    meta: RequestMeta,
) -> Result<Json<Vec<AppointmentReadDto>>, ProblemResponse> {
    match registry.list().await {
        Ok(items) => Ok(Json(
            items.into_iter().map(AppointmentReadDto::from).collect(),
        )),
        Err(e) => {
            debug!("Failed to list appointments: {}", e);
            Err(map_domain_error(&e, &meta))
        }
    }
}

pub async fn get_appointment(
    Extension(registry): Extension<Arc<AppointmentRegistry>>,
    meta: RequestMeta,
    id: PathId,
) -> Result<Json<AppointmentReadDto>, ProblemResponse> {
    let id = path_id(id, &meta)?;
    match registry.get(id).await {
        Ok(view) => Ok(Json(AppointmentReadDto::from(view))),
        Err(e) => {
            debug!("Failed to get appointment {}: {}", id, e);
            Err(map_domain_error(&e, &meta))
        }
    }
}

pub async fn create_appointment(
    Extension(registry): Extension<Arc<AppointmentRegistry>>,
    meta: RequestMeta,
    req: Body<CreateAppointmentReq>,
) -> Result<(StatusCode, Json<AppointmentDto>), ProblemResponse> {
    let req = body(req, &meta)?;
    match registry.create(req.into()).await {
        Ok(a) => Ok((StatusCode::CREATED, Json(AppointmentDto::from(a)))),
        Err(e) => {
            debug!("Failed to create appointment: {}", e);
            Err(map_domain_error(&e, &meta))
        }
    }
}

pub async fn update_appointment(
    Extension(registry): Extension<Arc<AppointmentRegistry>>,
    meta: RequestMeta,
    id: PathId,
    req: Body<UpdateAppointmentReq>,
) -> Result<Json<Option<AppointmentDto>>, ProblemResponse> {
    let id = path_id(id, &meta)?;
    let req = body(req, &meta)?;
    match registry.update(id, req.into()).await {
        Ok(a) => Ok(Json(a.map(AppointmentDto::from))),
        Err(e) => {
            debug!("Failed to update appointment {}: {}", id, e);
            Err(map_domain_error(&e, &meta))
        }
    }
}

pub async fn delete_appointment(
    Extension(registry): Extension<Arc<AppointmentRegistry>>,
    meta: RequestMeta,
    id: PathId,
) -> Result<StatusCode, ProblemResponse> {
    let id = path_id(id, &meta)?;
    match registry.delete(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            debug!("Failed to delete appointment {}: {}", id, e);
            Err(map_domain_error(&e, &meta))
        }
    }
}
