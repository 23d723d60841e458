pub mod client;
pub mod error;
pub mod model;
pub mod search;

pub use client::LawOfficeApi;
pub use error::LawOfficeError;
pub use model::*;
pub use crate::domain::error::EntityKind;
