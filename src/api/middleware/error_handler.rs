//! Renders AppError values as JSON error responses.
//!
//! Every error leaving the API goes through here, so status codes, wire
//! codes, and bodies stay consistent whether the error came from a handler,
//! an extractor, or axum's own routing fallbacks.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error_to_response_with_request_id(self, None)
    }
}

/// Status code and wire code for an error, decided in a single match so
/// the two cannot drift apart.
fn classify(error: &AppError) -> (StatusCode, &'static str) {
    match error {
        AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        AppError::Duplicate { .. } => (StatusCode::CONFLICT, "DUPLICATE_ENTRY"),
        AppError::Validation { .. } | AppError::ValidationErrors { .. } => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
        }
        AppError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        AppError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        AppError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        AppError::Database { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        AppError::Configuration { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
        }
        AppError::ConnectionPool { .. } => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        AppError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

/// The HTTP status an error maps to.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    classify(error).0
}

/// The wire code an error maps to.
pub fn error_to_code(error: &AppError) -> &'static str {
    classify(error).1
}

/// Builds the response body for an error.
///
/// Client-caused errors carry their full message. Server-side errors
/// (Database, Configuration, Internal) expose only the operation or key
/// that failed; their sources never reach the body.
fn error_body(error: &AppError) -> ErrorResponse {
    match error {
        AppError::NotFound {
            entity,
            field,
            value,
        } => ErrorResponse::not_found_error(entity, field, value),
        AppError::Duplicate {
            entity,
            field,
            value,
        } => ErrorResponse::duplicate_error(entity, field, value),
        AppError::Validation { field, reason } => ErrorResponse::validation_error(field, reason),
        AppError::ValidationErrors { errors } => {
            ErrorResponse::new("VALIDATION_ERROR", "Validation failed for one or more fields")
                .with_details(json!({ "errors": errors }))
        }
        AppError::BadRequest { message }
        | AppError::Unauthorized { message }
        | AppError::Forbidden { message } => ErrorResponse::new(error_to_code(error), message),
        AppError::Database { operation, .. } => ErrorResponse::new(
            "DATABASE_ERROR",
            &format!("Database operation failed: {operation}"),
        )
        .with_details(json!({ "operation": operation })),
        AppError::Configuration { key, .. } => {
            ErrorResponse::new("CONFIGURATION_ERROR", &format!("Configuration error: {key}"))
                .with_details(json!({ "key": key }))
        }
        AppError::ConnectionPool { .. } => {
            ErrorResponse::new("SERVICE_UNAVAILABLE", "Database connection unavailable")
        }
        AppError::Internal { .. } => {
            ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred")
        }
    }
}

/// Renders an error as a response, tagging the body with the request ID
/// when one is known.
pub fn error_to_response_with_request_id(error: AppError, request_id: Option<String>) -> Response {
    let status = error_to_status_code(&error);
    let mut body = error_body(&error);
    if let Some(id) = request_id {
        body = body.with_request_id(&id);
    }
    (status, Json(body)).into_response()
}

/// Middleware that rewrites plain-text error responses into the standard
/// JSON error shape.
///
/// Handlers returning AppError already produce JSON and pass through
/// untouched; this catches what axum produces on its own, such as 404s
/// from unmatched routes and 405s from wrong methods.
pub async fn global_error_handler(
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    // Stamped by the request ID middleware, which runs outside this one
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone());

    let response = next.run(request).await;

    if !(response.status().is_client_error() || response.status().is_server_error()) {
        return response;
    }

    let already_json = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if already_json {
        return response;
    }

    let status = response.status();
    let (_parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_else(|_| axum::body::Bytes::new());
    let original_message = String::from_utf8_lossy(&body_bytes).trim().to_string();

    let (code, default_message) = status_to_code(status);
    let mut body = ErrorResponse::new(
        code,
        if original_message.is_empty() {
            default_message
        } else {
            original_message.as_str()
        },
    );
    if let Some(id) = request_id {
        body = body.with_request_id(&id);
    }

    (status, Json(body)).into_response()
}

/// Wire code and fallback message for a bare HTTP error status.
fn status_to_code(status: StatusCode) -> (&'static str, &'static str) {
    match status {
        StatusCode::BAD_REQUEST => ("BAD_REQUEST", "Invalid or malformed request"),
        StatusCode::UNAUTHORIZED => ("UNAUTHORIZED", "Authentication required"),
        StatusCode::FORBIDDEN => ("FORBIDDEN", "Access denied"),
        StatusCode::NOT_FOUND => ("NOT_FOUND", "Resource not found"),
        StatusCode::METHOD_NOT_ALLOWED => ("METHOD_NOT_ALLOWED", "Method not allowed"),
        StatusCode::REQUEST_TIMEOUT => ("REQUEST_TIMEOUT", "Request timed out"),
        StatusCode::PAYLOAD_TOO_LARGE => ("PAYLOAD_TOO_LARGE", "Request body too large"),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => ("UNSUPPORTED_MEDIA_TYPE", "Unsupported media type"),
        StatusCode::UNPROCESSABLE_ENTITY => ("UNPROCESSABLE_CONTENT", "Unprocessable content"),
        StatusCode::INTERNAL_SERVER_ERROR => ("INTERNAL_ERROR", "An internal error occurred"),
        StatusCode::BAD_GATEWAY => ("BAD_GATEWAY", "Bad gateway"),
        StatusCode::SERVICE_UNAVAILABLE => ("SERVICE_UNAVAILABLE", "Service unavailable"),
        StatusCode::GATEWAY_TIMEOUT => ("GATEWAY_TIMEOUT", "Gateway timeout"),
        _ => ("UNKNOWN_ERROR", "An unknown error occurred"),
    }
}
