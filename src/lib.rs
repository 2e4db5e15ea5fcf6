//! Brigade Library
//!
//! Organization-scoped project management API. Projects are visible only
//! to members of their organization; requests authenticate with opaque
//! bearer tokens held server-side. The crate is layered api -> services
//! -> repositories over an async PostgreSQL pool.

use shadow_rs::shadow;
shadow!(build);

pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod server;
pub mod services;
pub mod state;
pub mod utils;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}
