//! OAuth application repository for async database operations.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::AppError;
use crate::models::{Application, NewApplication};

/// Application repository holding an async connection pool.
#[derive(Clone)]
pub struct ApplicationRepository {
    pool: AsyncDbPool,
}

impl ApplicationRepository {
    /// Creates a new ApplicationRepository with the given connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    /// Registers a new OAuth application.
    pub async fn create(&self, new_application: NewApplication) -> Result<Application, AppError> {
        use crate::schema::applications::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(applications)
            .values(&new_application)
            .returning(Application::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Finds an application by its public client identifier.
    ///
    /// # Returns
    /// `Some(Application)` if found, `None` otherwise
    pub async fn find_by_client_id(
        &self,
        client: &str,
    ) -> Result<Option<Application>, AppError> {
        use crate::schema::applications::dsl::*;
        let mut conn = self.pool.get().await?;

        applications
            .filter(client_id.eq(client))
            .select(Application::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }
}
