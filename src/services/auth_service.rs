//! Authentication service for bearer-token validation and issuance.
//!
//! Tokens are opaque random strings stored in access_tokens; validating a
//! request is a database lookup plus an expiry check. Token issuance and
//! application registration live here too, used by operational tooling and
//! test fixtures rather than any HTTP endpoint.

use chrono::{Duration, Utc};

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    AccessToken, Application, ClientType, GrantType, NewAccessToken, NewApplication,
};
use crate::repositories::{AccessTokenRepository, ApplicationRepository};
use crate::utils::{generate_token, hash_password, verify_password};

/// The authenticated caller, resolved from a bearer token.
///
/// Inserted into request extensions by the auth middleware so handlers can
/// take it as an `Extension` parameter.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub scopes: Vec<String>,
}

/// Authentication service for handling token-related business logic.
#[derive(Clone)]
pub struct AuthService {
    access_tokens: AccessTokenRepository,
    applications: ApplicationRepository,
    config: AuthConfig,
}

impl AuthService {
    /// Creates a new AuthService with the given repositories and config.
    pub fn new(
        access_tokens: AccessTokenRepository,
        applications: ApplicationRepository,
        config: AuthConfig,
    ) -> Self {
        Self {
            access_tokens,
            applications,
            config,
        }
    }

    /// Validates a bearer token and resolves the calling user.
    ///
    /// # Returns
    /// The authenticated user, or `Unauthorized` when the token is unknown
    /// or past its expiry
    pub async fn authenticate_token(&self, token: &str) -> AppResult<AuthUser> {
        let Some((access_token, user)) = self.access_tokens.find_with_user(token).await? else {
            return Err(AppError::Unauthorized {
                message: "Invalid access token".to_string(),
            });
        };

        if access_token.is_expired() {
            return Err(AppError::Unauthorized {
                message: "Access token has expired".to_string(),
            });
        }

        Ok(AuthUser {
            user_id: user.id,
            username: user.username,
            email: user.email,
            scopes: access_token.scopes().map(str::to_owned).collect(),
        })
    }

    /// Issues a new opaque access token for a user.
    ///
    /// Token length, lifetime and the default scope come from the `[auth]`
    /// config section.
    ///
    /// # Arguments
    /// * `user_id` - Owner of the token
    /// * `application_id` - Issuing application, if any
    /// * `scope` - Space-separated scope string; `None` uses the configured
    ///   default
    pub async fn issue_token(
        &self,
        user_id: i32,
        application_id: Option<i32>,
        scope: Option<&str>,
    ) -> AppResult<AccessToken> {
        let new_token = NewAccessToken {
            token: generate_token(self.config.token_length),
            user_id,
            application_id,
            expires: Utc::now().naive_utc() + Duration::hours(self.config.access_token_expiration),
            scope: scope.unwrap_or(&self.config.default_scope).to_string(),
        };

        self.access_tokens.create(new_token).await
    }

    /// Validates application credentials against the stored argon2 hash.
    ///
    /// Unknown client ids and wrong secrets produce the same error.
    pub async fn authenticate_client(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> AppResult<Application> {
        let Some(application) = self.applications.find_by_client_id(client_id).await? else {
            return Err(AppError::Unauthorized {
                message: "Invalid client credentials".to_string(),
            });
        };

        if !verify_password(client_secret, &application.client_secret)? {
            return Err(AppError::Unauthorized {
                message: "Invalid client credentials".to_string(),
            });
        }

        Ok(application)
    }

    /// Registers an OAuth application with generated credentials.
    ///
    /// The client secret is stored argon2-hashed; the plain value is
    /// returned once alongside the stored row and cannot be recovered later.
    pub async fn register_application(
        &self,
        name: &str,
        owner_id: Option<i32>,
        client_type: ClientType,
        grant_type: GrantType,
    ) -> AppResult<(Application, String)> {
        let client_secret = generate_token(128);

        let new_application = NewApplication {
            client_id: generate_token(40),
            client_secret: hash_password(&client_secret)?,
            name: name.to_string(),
            user_id: owner_id,
            client_type,
            authorization_grant_type: grant_type,
        };

        let application = self.applications.create(new_application).await?;
        Ok((application, client_secret))
    }
}
