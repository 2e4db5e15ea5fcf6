//! One handler per CLI command.
//!
//! Parsing and validation happen before a handler runs; handlers only
//! execute an already-validated command against loaded settings.

pub mod migrate;
pub mod serve;

pub use migrate::MigrateCommandHandler;
pub use serve::ServeCommandHandler;
