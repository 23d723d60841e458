//! Type-safe API operation builder with compile-time guarantees
//!
//! The type-state pattern ensures:
//! - `register()` cannot be called unless a handler is set
//! - `register()` cannot be called unless at least one response is declared
//! - Descriptive methods remain available at any stage
//!
//! Registering an operation adds the axum route and hands an [`OperationSpec`]
//! to the [`OpenApiRegistry`], so the served OpenAPI document always matches
//! the mounted routes.

use axum::{handler::Handler, routing::MethodRouter, Router};
use http::Method;
use std::marker::PhantomData;

use crate::api::problem;

/// Type alias for schema collections used in API operations.
pub type SchemaCollection = Vec<(
    String,
    utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>,
)>;

/// Type-state markers for compile-time enforcement
pub mod state {
    /// Marker for missing required components
    #[derive(Debug, Clone, Copy)]
    pub struct Missing;

    /// Marker for present required components
    #[derive(Debug, Clone, Copy)]
    pub struct Present;
}

mod sealed {
    pub trait Sealed {}
}

/// Maps handler state to the router slot type: `()` when missing,
/// `MethodRouter<S>` when present.
pub trait HandlerSlot<S>: sealed::Sealed {
    type Slot;
}

impl sealed::Sealed for Missing {}
impl sealed::Sealed for Present {}

impl<S> HandlerSlot<S> for Missing {
    type Slot = ();
}
impl<S> HandlerSlot<S> for Present {
    type Slot = MethodRouter<S>;
}

pub use state::{Missing, Present};

/// Path parameter of an operation; OpenAPI marks every path parameter required.
#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub name: String,
    pub description: Option<String>,
    /// JSON Schema type (string, integer, etc.)
    pub param_type: String,
    /// JSON Schema format (uuid, date-time, etc.)
    pub format: Option<String>,
}

/// Request body specification for API operations
#[derive(Clone, Debug)]
pub struct RequestBodySpec {
    pub content_type: &'static str,
    pub description: Option<String>,
    /// Name of a registered component schema.
    pub schema_name: Option<String>,
    pub required: bool,
}

/// Response specification for API operations
#[derive(Clone, Debug)]
pub struct ResponseSpec {
    pub status: u16,
    /// `None` for responses without a body (e.g. 204).
    pub content_type: Option<&'static str>,
    pub description: String,
    /// Name of a registered component schema (if any).
    pub schema_name: Option<String>,
    /// The body may be JSON `null` in addition to the schema.
    pub nullable: bool,
    /// The body is a JSON array of the schema.
    pub array: bool,
}

/// Operation specification collected by the builder
#[derive(Clone, Debug)]
pub struct OperationSpec {
    pub method: Method,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub params: Vec<ParamSpec>,
    pub request_body: Option<RequestBodySpec>,
    pub responses: Vec<ResponseSpec>,
    /// Stable id derived from method and path
    pub handler_id: String,
}

/// Registry trait for OpenAPI operations and schemas
pub trait OpenApiRegistry {
    /// Register an API operation specification
    fn register_operation(&self, spec: &OperationSpec);

    /// Ensure schemas are registered under components and return the
    /// canonical component name for `$ref`.
    fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String;

    /// Downcast support for accessing the concrete implementation if needed.
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Register `T` (and everything it references) and return its component name.
pub fn ensure_schema<T: utoipa::ToSchema + utoipa::PartialSchema + 'static>(
    registry: &dyn OpenApiRegistry,
) -> String {
    use utoipa::PartialSchema;

    let root_name = T::name().to_string();

    // T's own schema goes first so the component is an object, not a self-ref.
    let mut collected: SchemaCollection = vec![(root_name.clone(), <T as PartialSchema>::schema())];
    T::schemas(&mut collected);

    registry.ensure_schema_raw(&root_name, collected)
}

/// Type-safe operation builder.
///
/// Generic parameters:
/// - `H`: Handler state (Missing | Present)
/// - `R`: Response state (Missing | Present)
/// - `S`: Router state type
pub struct OperationBuilder<H, R, S>
where
    H: HandlerSlot<S>,
{
    spec: OperationSpec,
    method_router: <H as HandlerSlot<S>>::Slot,
    _has_handler: PhantomData<H>,
    _has_response: PhantomData<R>,
    _state: PhantomData<fn() -> S>,
}

impl<S> OperationBuilder<Missing, Missing, S> {
    /// Create a new operation builder with an HTTP method and path
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path_str = path.into();
        let handler_id = format!(
            "{}:{}",
            method.as_str().to_lowercase(),
            path_str.replace(['/', '{', '}'], "_")
        );

        Self {
            spec: OperationSpec {
                method,
                path: path_str,
                operation_id: None,
                summary: None,
                description: None,
                tags: Vec::new(),
                params: Vec::new(),
                request_body: None,
                responses: Vec::new(),
                handler_id,
            },
            method_router: (),
            _has_handler: PhantomData,
            _has_response: PhantomData,
            _state: PhantomData,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }
}

// Descriptive methods, available at any stage
impl<H, R, S> OperationBuilder<H, R, S>
where
    H: HandlerSlot<S>,
{
    /// Inspect the spec (primarily for tests)
    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.spec.operation_id = Some(id.into());
        self
    }

    pub fn summary(mut self, text: impl Into<String>) -> Self {
        self.spec.summary = Some(text.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.spec.description = Some(text.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.spec.tags.push(tag.into());
        self
    }

    /// Add a UUID path parameter
    pub fn uuid_path_param(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.spec.params.push(ParamSpec {
            name: name.into(),
            description: Some(description.into()),
            param_type: "string".to_string(),
            format: Some("uuid".to_string()),
        });
        self
    }

    /// Attach a required JSON request body and register its schema.
    pub fn json_request<T>(mut self, registry: &dyn OpenApiRegistry, desc: impl Into<String>) -> Self
    where
        T: utoipa::ToSchema + utoipa::PartialSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.spec.request_body = Some(RequestBodySpec {
            content_type: "application/json",
            description: Some(desc.into()),
            schema_name: Some(name),
            required: true,
        });
        self
    }

    fn push_response(&mut self, resp: ResponseSpec) {
        self.spec.responses.push(resp);
    }

    fn into_response_present(self) -> OperationBuilder<H, Present, S> {
        OperationBuilder {
            spec: self.spec,
            method_router: self.method_router,
            _has_handler: self._has_handler,
            _has_response: PhantomData::<Present>,
            _state: self._state,
        }
    }
}

// Handler setting: Missing -> Present
impl<R, S> OperationBuilder<Missing, R, S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Set the handler for this operation.
    pub fn handler<F, T>(self, h: F) -> OperationBuilder<Present, R, S>
    where
        F: Handler<T, S> + Clone + Send + 'static,
        T: 'static,
    {
        let method_router = match self.spec.method {
            Method::GET => axum::routing::get(h),
            Method::POST => axum::routing::post(h),
            Method::PUT => axum::routing::put(h),
            Method::DELETE => axum::routing::delete(h),
            Method::PATCH => axum::routing::patch(h),
            _ => axum::routing::any(|| async { axum::http::StatusCode::METHOD_NOT_ALLOWED }),
        };

        OperationBuilder {
            spec: self.spec,
            method_router,
            _has_handler: PhantomData::<Present>,
            _has_response: self._has_response,
            _state: self._state,
        }
    }
}

// Responses. Every method moves R to Present; on an already-present builder it just appends.
impl<H, R, S> OperationBuilder<H, R, S>
where
    H: HandlerSlot<S>,
{
    /// JSON response with a registered schema.
    pub fn json_response_with_schema<T>(
        mut self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S>
    where
        T: utoipa::ToSchema + utoipa::PartialSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.push_response(ResponseSpec {
            status,
            content_type: Some("application/json"),
            description: description.into(),
            schema_name: Some(name),
            nullable: false,
            array: false,
        });
        self.into_response_present()
    }

    /// JSON response whose body is an array of `T`.
    pub fn json_array_response<T>(
        mut self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S>
    where
        T: utoipa::ToSchema + utoipa::PartialSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.push_response(ResponseSpec {
            status,
            content_type: Some("application/json"),
            description: description.into(),
            schema_name: Some(name),
            nullable: false,
            array: true,
        });
        self.into_response_present()
    }

    /// JSON response whose body is either the schema or `null`.
    pub fn nullable_json_response<T>(
        mut self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S>
    where
        T: utoipa::ToSchema + utoipa::PartialSchema + 'static,
    {
        let name = ensure_schema::<T>(registry);
        self.push_response(ResponseSpec {
            status,
            content_type: Some("application/json"),
            description: description.into(),
            schema_name: Some(name),
            nullable: true,
            array: false,
        });
        self.into_response_present()
    }

    /// Response without a body (e.g. 204 No Content).
    pub fn empty_response(
        mut self,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S> {
        self.push_response(ResponseSpec {
            status,
            content_type: None,
            description: description.into(),
            schema_name: None,
            nullable: false,
            array: false,
        });
        self.into_response_present()
    }

    /// RFC 9457 `application/problem+json` response.
    pub fn problem_response(
        mut self,
        registry: &dyn OpenApiRegistry,
        status: u16,
        description: impl Into<String>,
    ) -> OperationBuilder<H, Present, S> {
        let problem_name = ensure_schema::<problem::Problem>(registry);
        self.push_response(ResponseSpec {
            status,
            content_type: Some(problem::APPLICATION_PROBLEM_JSON),
            description: description.into(),
            schema_name: Some(problem_name),
            nullable: false,
            array: false,
        });
        self.into_response_present()
    }
}

// Registration requires both handler and response
impl<S> OperationBuilder<Present, Present, S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Describe the operation into `openapi` and mount the route.
    pub fn register(self, router: Router<S>, openapi: &dyn OpenApiRegistry) -> Router<S> {
        openapi.register_operation(&self.spec);
        router.route(&self.spec.path, self.method_router)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct MockRegistry {
        operations: Mutex<Vec<OperationSpec>>,
        schemas: Mutex<Vec<String>>,
    }

    impl OpenApiRegistry for MockRegistry {
        fn register_operation(&self, spec: &OperationSpec) {
            self.operations.lock().push(spec.clone());
        }

        fn ensure_schema_raw(&self, name: &str, _schemas: SchemaCollection) -> String {
            self.schemas.lock().push(name.to_string());
            name.to_string()
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    async fn test_handler() -> Json<serde_json::Value> {
        Json(serde_json::json!({"status": "ok"}))
    }

    #[test]
    fn descriptive_methods_fill_spec() {
        let builder = OperationBuilder::<Missing, Missing, ()>::get("/api/clients/{id}")
            .operation_id("law_office.get_client")
            .summary("Get client")
            .description("Fetch one client")
            .tag("clients")
            .uuid_path_param("id", "Client id");

        let spec = builder.spec();
        assert_eq!(spec.method, Method::GET);
        assert_eq!(spec.path, "/api/clients/{id}");
        assert_eq!(spec.operation_id.as_deref(), Some("law_office.get_client"));
        assert_eq!(spec.tags, vec!["clients"]);
        assert_eq!(spec.params[0].format.as_deref(), Some("uuid"));
        assert_eq!(spec.handler_id, "get:_api_clients__id_");
    }

    #[tokio::test]
    async fn register_records_operation_and_schemas() {
        let registry = MockRegistry::default();

        let _router = OperationBuilder::<Missing, Missing, ()>::post("/api/things")
            .json_request::<problem::ValidationError>(&registry, "body")
            .handler(test_handler)
            .json_response_with_schema::<problem::ValidationError>(&registry, 201, "Created")
            .problem_response(&registry, 400, "Bad Request")
            .register(Router::new(), &registry);

        let ops = registry.operations.lock();
        assert_eq!(ops.len(), 1);
        let op = &ops[0];
        assert_eq!(op.method, Method::POST);
        assert!(op.request_body.as_ref().is_some_and(|b| b.required));
        assert_eq!(op.responses.len(), 2);
        assert_eq!(
            op.responses[1].content_type,
            Some(problem::APPLICATION_PROBLEM_JSON)
        );

        let schemas = registry.schemas.lock();
        assert!(schemas.contains(&"Problem".to_string()));
        assert!(schemas.contains(&"ValidationError".to_string()));
    }

    #[test]
    fn empty_and_nullable_responses() {
        let registry = MockRegistry::default();
        let b = OperationBuilder::<Missing, Missing, ()>::delete("/x/{id}")
            .empty_response(204, "Deleted")
            .nullable_json_response::<problem::Problem>(&registry, 200, "maybe");
        assert_eq!(b.spec().responses[0].content_type, None);
        assert!(b.spec().responses[1].nullable);
    }

    #[test]
    fn array_response_registers_item_schema() {
        let registry = MockRegistry::default();
        let b = OperationBuilder::<Missing, Missing, ()>::get("/x")
            .json_array_response::<problem::ValidationError>(&registry, 200, "all");
        let resp = &b.spec().responses[0];
        assert!(resp.array);
        assert_eq!(resp.schema_name.as_deref(), Some("ValidationError"));
    }
}
