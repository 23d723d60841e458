use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use modkit::api::problem::{Problem, ProblemResponse};
use modkit::RequestMeta;

use crate::domain::error::{DomainError, EntityKind};

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    meta: &RequestMeta,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.example.com/{code}"))
        .with_code(code)
        .for_request(meta);
    ProblemResponse(problem)
}

fn not_found_code(entity: EntityKind) -> &'static str {
    match entity {
        EntityKind::Client => "LAW_OFFICE_CLIENT_NOT_FOUND",
        EntityKind::Case => "LAW_OFFICE_CASE_NOT_FOUND",
        EntityKind::Appointment => "LAW_OFFICE_APPOINTMENT_NOT_FOUND",
    }
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, meta: &RequestMeta) -> ProblemResponse {
    match e {
        DomainError::NotFound { entity, id } => from_parts(
            StatusCode::NOT_FOUND,
            not_found_code(*entity),
            &format!("{entity} not found"),
            format!("{entity} with id {id} was not found"),
            meta,
        ),
        DomainError::EmailAlreadyExists { email } => from_parts(
            StatusCode::BAD_REQUEST,
            "LAW_OFFICE_EMAIL_CONFLICT",
            "Email already exists",
            format!("Email '{email}' is already in use"),
            meta,
        ),
        DomainError::UnknownReference { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "LAW_OFFICE_UNKNOWN_REFERENCE",
            "Unknown reference",
            e.to_string(),
            meta,
        ),
        DomainError::Validation { .. } => from_parts(
            StatusCode::BAD_REQUEST,
            "LAW_OFFICE_VALIDATION",
            "Validation error",
            e.to_string(),
            meta,
        ),
        DomainError::Database { .. } => {
            // Details stay in the log; the response carries a generic message.
            tracing::error!(
                error = ?e,
                path = %meta.path,
                request_id = meta.request_id.as_deref().unwrap_or("-"),
                "Database error occurred"
            );
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "LAW_OFFICE_INTERNAL",
                "Internal error",
                "An internal error occurred",
                meta,
            )
        }
    }
}

/// Malformed JSON, a missing required field or an out-of-set enum value.
pub fn invalid_body(rejection: &JsonRejection, meta: &RequestMeta) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "LAW_OFFICE_INVALID_BODY",
        "Invalid request body",
        rejection.body_text(),
        meta,
    )
}

pub fn invalid_id(rejection: &PathRejection, meta: &RequestMeta) -> ProblemResponse {
    from_parts(
        StatusCode::BAD_REQUEST,
        "LAW_OFFICE_INVALID_ID",
        "Invalid identifier",
        rejection.body_text(),
        meta,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn meta() -> RequestMeta {
        RequestMeta {
            path: "/api/clients/x".into(),
            request_id: Some("rid-7".into()),
        }
    }

    #[test]
    fn not_found_carries_entity_code_and_request() {
        let e = DomainError::not_found(EntityKind::Case, Uuid::nil());
        let ProblemResponse(p) = map_domain_error(&e, &meta());
        assert_eq!(p.status, 404);
        assert_eq!(p.code, "LAW_OFFICE_CASE_NOT_FOUND");
        assert_eq!(p.type_url, "https://errors.example.com/LAW_OFFICE_CASE_NOT_FOUND");
        assert_eq!(p.instance, "/api/clients/x");
        assert_eq!(p.request_id.as_deref(), Some("rid-7"));
    }

    #[test]
    fn validation_failures_are_bad_requests() {
        for e in [
            DomainError::email_already_exists("john@example.com"),
            DomainError::validation("title", "is required"),
            DomainError::unknown_reference("clientId", EntityKind::Client, Uuid::nil()),
        ] {
            assert_eq!(map_domain_error(&e, &meta()).0.status, 400, "{e}");
        }
    }

    #[test]
    fn database_details_are_not_leaked() {
        let e = DomainError::database("connection refused to 10.0.0.5:5432");
        let ProblemResponse(p) = map_domain_error(&e, &meta());
        assert_eq!(p.status, 500);
        assert_eq!(p.code, "LAW_OFFICE_INTERNAL");
        assert!(!p.detail.contains("10.0.0.5"));
    }
}
