//! Stamps every request with an ID for log and error correlation.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Identifier assigned to the current request, readable from extensions.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Honors an incoming `x-request-id` header, minting a UUID v4 when the
/// caller sent none. The ID travels in request extensions so that inner
/// middleware and handlers can attach it to logs and error bodies, and it
/// is echoed back on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let id = match request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(provided) => provided.to_owned(),
        None => Uuid::new_v4().to_string(),
    };

    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        let name = HeaderName::from_static(REQUEST_ID_HEADER);
        response.headers_mut().insert(name, value);
    }
    response
}
