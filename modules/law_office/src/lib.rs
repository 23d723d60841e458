//! Law office module: clients, their cases and appointments.
//!
//! Three registries over a SeaORM store, exposed under `/api` and as the
//! in-process [`LawOfficeApi`](contract::LawOfficeApi).

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::{client, error, model, search};

// === MODULE DEFINITION ===
pub mod module;
pub use module::{LawOffice, MODULE_NAME};

// === INTERNAL MODULES ===
// Exposed for integration tests; other crates should stick to `contract`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
