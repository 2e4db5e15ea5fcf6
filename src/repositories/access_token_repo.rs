//! Access token repository for async database operations.
//!
//! Bearer tokens are opaque strings stored server-side; authentication is a
//! lookup joined to the owning user.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::AppError;
use crate::models::{AccessToken, NewAccessToken, User};
use crate::schema::{access_tokens, users};

/// Access token repository holding an async connection pool.
#[derive(Clone)]
pub struct AccessTokenRepository {
    pool: AsyncDbPool,
}

impl AccessTokenRepository {
    /// Creates a new AccessTokenRepository with the given connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Stores a newly issued access token.
    pub async fn create(&self, new_token: NewAccessToken) -> Result<AccessToken, AppError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(access_tokens::table)
            .values(&new_token)
            .returning(AccessToken::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Looks up a token together with its owning user.
    ///
    /// Expiry is not checked here; callers decide what an expired token
    /// means for them.
    ///
    /// # Returns
    /// `Some((AccessToken, User))` if the token exists, `None` otherwise
    pub async fn find_with_user(
        &self,
        token_value: &str,
    ) -> Result<Option<(AccessToken, User)>, AppError> {
        let mut conn = self.pool.get().await?;

        access_tokens::table
            .inner_join(users::table)
            .filter(access_tokens::token.eq(token_value))
            .select((AccessToken::as_select(), User::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }
}
