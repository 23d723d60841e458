//! Runtime driver: runs a [`ModuleRegistry`](crate::ModuleRegistry) through its phases.

mod runner;
mod shutdown;

pub use runner::{run, DbOptions, RunOptions, ShutdownOptions};
pub use shutdown::wait_for_shutdown;

#[cfg(test)]
mod tests;
