//! Layered configuration loading.
//!
//! Sources are merged lowest to highest: `default.toml`, the
//! `{environment}.toml` selected by `BRIGADE_APP_ENV`, an optional
//! uncommitted `local.toml`, and finally `BRIGADE_*` environment
//! variables with `__` separating nested keys.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

// Re-export public types
pub use environment::Environment;
pub use loader::ConfigLoader;
pub use settings::{AuthConfig, DatabaseConfig, Settings};
