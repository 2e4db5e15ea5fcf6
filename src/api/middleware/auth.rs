//! Bearer token authentication.
//!
//! Every protected route sits behind this middleware. It resolves the
//! `Authorization: Bearer <token>` header against stored access tokens and
//! places the owning [`AuthUser`] in request extensions, where handlers
//! take it as an `Extension<AuthUser>` parameter.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

pub use crate::services::AuthUser;

/// Authenticates the request or fails with 401.
///
/// The token must exist in the database and be unexpired. The scheme
/// match is exact: `Bearer`, capitalized, followed by a non-empty token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let Some(bearer) = bearer else {
        return Err(unauthorized("Missing authorization header"));
    };
    let Some(token) = parse_bearer_token(bearer) else {
        return Err(unauthorized(
            "Invalid authorization header, expected 'Bearer <token>'",
        ));
    };

    let auth_user = state.services.auth.authenticate_token(token).await?;
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

fn unauthorized(message: &str) -> AppError {
    AppError::Unauthorized {
        message: message.to_string(),
    }
}

/// Extracts the token value from a `Bearer <token>` header.
fn parse_bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer_token_valid() {
        assert_eq!(
            parse_bearer_token("Bearer abc123DEF456"),
            Some("abc123DEF456")
        );
    }

    #[test]
    fn test_parse_bearer_token_missing_prefix() {
        assert_eq!(parse_bearer_token("abc123DEF456"), None);
    }

    #[test]
    fn test_parse_bearer_token_lowercase_scheme_rejected() {
        assert_eq!(parse_bearer_token("bearer abc123DEF456"), None);
    }

    #[test]
    fn test_parse_bearer_token_empty_token_rejected() {
        assert_eq!(parse_bearer_token("Bearer "), None);
    }

    #[test]
    fn test_parse_bearer_token_basic_scheme_rejected() {
        assert_eq!(parse_bearer_token("Basic dXNlcjpwYXNz"), None);
    }
}
