//! HTTP API layer.
//!
//! Request handlers, middleware, request/response DTOs, router assembly
//! and the OpenAPI document live here. Everything below `services` is
//! transport-agnostic; this module owns all axum-specific code.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
mod doc;
