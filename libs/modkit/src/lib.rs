//! # ModKit - Module System
//!
//! A small crate for composing an application out of modules that are
//! registered explicitly and driven through ordered phases.
//!
//! ## Phases
//!
//! init (config + DI) → db (migrations on first connect) → rest (router
//! composition against the single REST host) → start → wait → stop.
//!
//! ## Example
//!
//! ```rust,ignore
//! use modkit::{ModuleEntry, ModuleRegistry};
//!
//! let registry = ModuleRegistry::builder()
//!     .register(ModuleEntry::new("api_ingress", ingress.clone()).rest_host(ingress.clone()).stateful(ingress))
//!     .register(ModuleEntry::new("law_office", office.clone()).db(office.clone()).rest(office))
//!     .build()?;
//! ```

pub use anyhow::Result;
pub use async_trait::async_trait;

// Module system exports
pub use crate::contracts::*;
pub mod context;
pub use context::{ConfigProvider, ModuleCtx, ModuleCtxBuilder};

pub mod registry;
pub use registry::{ModuleEntry, ModuleRegistry, RegistryError};

// Core module contracts and traits
pub mod contracts;
// Type-safe API operation builder
pub mod api;
pub use api::problem::{
    bad_request, internal_error, not_found, Problem, ProblemResponse, ValidationError,
};
pub use api::{OpenApiRegistry, OperationBuilder, RequestMeta};

pub mod runtime;
pub use runtime::{run, DbOptions, RunOptions, ShutdownOptions};

mod tests;
