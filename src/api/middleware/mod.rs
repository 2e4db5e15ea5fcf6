//! Request-processing middleware.
//!
//! Ordering matters: request-id runs first so the logging and error
//! layers can tag everything they emit, and bearer auth wraps only the
//! routes that need a caller.

mod auth;
mod error_handler;
mod logging;
mod request_id;

pub use auth::{AuthUser, auth_middleware};
pub use error_handler::global_error_handler;
pub use logging::logging_middleware;
pub use request_id::{RequestId, request_id_middleware};
