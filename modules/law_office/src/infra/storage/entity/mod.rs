//! SeaORM entities. Enumerated fields are stored as their wire strings.

pub mod appointment;
pub mod case;
pub mod client;
