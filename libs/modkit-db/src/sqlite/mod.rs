//! SQLite-specific DSN helpers.

mod dsn;

pub use dsn::{absolutize_sqlite_dsn, is_memory_dsn};
pub(crate) use dsn::prepare_sqlite_path;
