//! Shared application state for axum handlers.

use crate::config::AuthConfig;
use crate::db::AsyncDbPool;
use crate::repositories::Repositories;
use crate::services::Services;

/// State injected into every handler through axum's `State` extractor.
///
/// Cloning is cheap: `Services` and `AsyncDbPool` are Arc-backed.
#[derive(Clone)]
pub struct AppState {
    /// Service layer, one instance per process
    pub services: Services,
    /// Direct pool access for health probes and tests
    pub db_pool: AsyncDbPool,
}

impl AppState {
    /// Builds repositories and services over `pool`.
    ///
    /// # Example
    /// ```ignore
    /// let pool = establish_async_connection_pool(&settings.database).await?;
    /// let state = AppState::new(pool, settings.auth.clone());
    /// ```
    pub fn new(pool: AsyncDbPool, auth_config: AuthConfig) -> Self {
        let repos = Repositories::new(pool.clone());
        let services = Services::new(repos, auth_config);
        Self {
            services,
            db_pool: pool,
        }
    }
}
