//! REST building blocks: RFC 9457 problems, request metadata and the
//! type-state operation builder that registers a route and its OpenAPI
//! description in one step.

pub mod operation_builder;
pub mod problem;
pub mod request_meta;

pub use operation_builder::{
    ensure_schema, state, Missing, OpenApiRegistry, OperationBuilder, OperationSpec,
    ParamSpec, Present, RequestBodySpec, ResponseSpec, SchemaCollection,
};
pub use request_meta::RequestMeta;
