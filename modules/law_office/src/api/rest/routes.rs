use axum::{Extension, Router};
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};
use std::sync::Arc;

use crate::api::rest::{dto, handlers};
use crate::domain::{AppointmentRegistry, CaseRegistry, ClientRegistry};

type Op = OperationBuilder<Missing, Missing, ()>;

/// Registries shared by the handlers through `Extension` layers.
#[derive(Clone)]
pub struct Registries {
    pub clients: Arc<ClientRegistry>,
    pub cases: Arc<CaseRegistry>,
    pub appointments: Arc<AppointmentRegistry>,
}

pub fn register_routes(
    mut router: Router,
    openapi: &dyn OpenApiRegistry,
    registries: Registries,
) -> anyhow::Result<Router> {
    router = register_client_routes(router, openapi);
    router = register_case_routes(router, openapi);
    router = register_appointment_routes(router, openapi);

    router = router
        .layer(Extension(registries.clients))
        .layer(Extension(registries.cases))
        .layer(Extension(registries.appointments));

    Ok(router)
}

fn register_client_routes(mut router: Router, openapi: &dyn OpenApiRegistry) -> Router {
    // GET /api/clients - List all clients
    router = Op::get("/api/clients")
        .operation_id("law_office.list_clients")
        .summary("List all clients")
        .description("All clients, newest created first")
        .tag("clients")
        .handler(handlers::list_clients)
        .json_array_response::<dto::ClientDto>(openapi, 200, "List of clients")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // GET /api/clients/{id} - Get a specific client
    router = Op::get("/api/clients/{id}")
        .operation_id("law_office.get_client")
        .summary("Get client by ID")
        .tag("clients")
        .uuid_path_param("id", "Client UUID")
        .handler(handlers::get_client)
        .json_response_with_schema::<dto::ClientDto>(openapi, 200, "Client found")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // POST /api/clients - Create a new client
    router = Op::post("/api/clients")
        .operation_id("law_office.create_client")
        .summary("Create a new client")
        .description("Email must not be used by another client")
        .tag("clients")
        .json_request::<dto::CreateClientReq>(openapi, "Client creation data")
        .handler(handlers::create_client)
        .json_response_with_schema::<dto::ClientDto>(openapi, 201, "Created client")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // PUT /api/clients/{id} - Update a client
    router = Op::put("/api/clients/{id}")
        .operation_id("law_office.update_client")
        .summary("Update client")
        .description("Partial update; responds with null when the client does not exist")
        .tag("clients")
        .uuid_path_param("id", "Client UUID")
        .json_request::<dto::UpdateClientReq>(openapi, "Client update data")
        .handler(handlers::update_client)
        .nullable_json_response::<dto::ClientDto>(openapi, 200, "Updated client or null")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // DELETE /api/clients/{id} - Delete a client
    Op::delete("/api/clients/{id}")
        .operation_id("law_office.delete_client")
        .summary("Delete client")
        .description("Cases and appointments of the client are kept")
        .tag("clients")
        .uuid_path_param("id", "Client UUID")
        .handler(handlers::delete_client)
        .empty_response(204, "Client deleted")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi)
}

fn register_case_routes(mut router: Router, openapi: &dyn OpenApiRegistry) -> Router {
    router = Op::get("/api/cases")
        .operation_id("law_office.list_cases")
        .summary("List all cases")
        .description("All cases, newest created first, with the client's name joined in")
        .tag("cases")
        .handler(handlers::list_cases)
        .json_array_response::<dto::CaseReadDto>(openapi, 200, "List of cases")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = Op::get("/api/cases/{id}")
        .operation_id("law_office.get_case")
        .summary("Get case by ID")
        .tag("cases")
        .uuid_path_param("id", "Case UUID")
        .handler(handlers::get_case)
        .json_response_with_schema::<dto::CaseReadDto>(openapi, 200, "Case found")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = Op::post("/api/cases")
        .operation_id("law_office.create_case")
        .summary("Create a new case")
        .tag("cases")
        .json_request::<dto::CreateCaseReq>(openapi, "Case creation data")
        .handler(handlers::create_case)
        .json_response_with_schema::<dto::CaseDto>(openapi, 201, "Created case")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = Op::put("/api/cases/{id}")
        .operation_id("law_office.update_case")
        .summary("Update case")
        .description("Partial update; responds with null when the case does not exist")
        .tag("cases")
        .uuid_path_param("id", "Case UUID")
        .json_request::<dto::UpdateCaseReq>(openapi, "Case update data")
        .handler(handlers::update_case)
        .nullable_json_response::<dto::CaseDto>(openapi, 200, "Updated case or null")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    Op::delete("/api/cases/{id}")
        .operation_id("law_office.delete_case")
        .summary("Delete case")
        .tag("cases")
        .uuid_path_param("id", "Case UUID")
        .handler(handlers::delete_case)
        .empty_response(204, "Case deleted")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi)
}

fn register_appointment_routes(mut router: Router, openapi: &dyn OpenApiRegistry) -> Router {
    router = Op::get("/api/appointments")
        .operation_id("law_office.list_appointments")
        .summary("List all appointments")
        .description("Ordered by appointment date, earliest first")
        .tag("appointments")
        .handler(handlers::list_appointments)
        .json_array_response::<dto::AppointmentReadDto>(openapi, 200, "List of appointments")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = Op::get("/api/appointments/{id}")
        .operation_id("law_office.get_appointment")
        .summary("Get appointment by ID")
        .tag("appointments")
        .uuid_path_param("id", "Appointment UUID")
        .handler(handlers::get_appointment)
        .json_response_with_schema::<dto::AppointmentReadDto>(openapi, 200, "Appointment found")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = Op::post("/api/appointments")
        .operation_id("law_office.create_appointment")
        .summary("Create a new appointment")
        .tag("appointments")
        .json_request::<dto::CreateAppointmentReq>(openapi, "Appointment creation data")
        .handler(handlers::create_appointment)
        .json_response_with_schema::<dto::AppointmentDto>(openapi, 201, "Created appointment")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = Op::put("/api/appointments/{id}")
        .operation_id("law_office.update_appointment")
        .summary("Update appointment")
        .description("Partial update; responds with null when the appointment does not exist")
        .tag("appointments")
        .uuid_path_param("id", "Appointment UUID")
        .json_request::<dto::UpdateAppointmentReq>(openapi, "Appointment update data")
        .handler(handlers::update_appointment)
        .nullable_json_response::<dto::AppointmentDto>(openapi, 200, "Updated appointment or null")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    Op::delete("/api/appointments/{id}")
        .operation_id("law_office.delete_appointment")
        .summary("Delete appointment")
        .tag("appointments")
        .uuid_path_param("id", "Appointment UUID")
        .handler(handlers::delete_appointment)
        .empty_response(204, "Appointment deleted")
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi)
}
