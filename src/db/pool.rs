//! bb8 connection pooling over diesel-async PostgreSQL connections,
//! plus the embedded migration harness.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::Pool;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};

use crate::config::DatabaseConfig;
use crate::error::AppError;

/// All schema migrations compiled into the binary
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Shared async pool. `bb8::Pool` is reference-counted internally, so
/// holders derive `Clone` rather than wrapping another `Arc`.
pub type AsyncDbPool = Pool<AsyncPgConnection>;

/// Builds the pool with the sizing and timeout from `config`. Fails with
/// `AppError::ConnectionPool` when the backend is unreachable within the
/// connection timeout.
pub async fn establish_async_connection_pool(
    config: &DatabaseConfig,
) -> Result<AsyncDbPool, AppError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url.clone());
    let pool = Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(Duration::from_secs(config.connection_timeout))
        .build(manager)
        .await
        .map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })?;
    Ok(pool)
}

/// Applies all pending migrations and returns the names of the applied ones.
///
/// diesel_migrations only supports synchronous connections, so the work runs
/// on a blocking thread with its own short-lived connection.
pub async fn run_pending_migrations(database_url: &str) -> Result<Vec<String>, AppError> {
    let database_url = database_url.to_string();
    let applied = tokio::task::spawn_blocking(move || {
        use diesel::Connection;
        use diesel::pg::PgConnection;
        use diesel_migrations::MigrationHarness;

        let mut conn =
            PgConnection::establish(&database_url).map_err(|e| AppError::Database {
                operation: "establish connection for migrations".to_string(),
                source: anyhow::anyhow!("could not connect: {}", e),
            })?;

        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::Database {
                operation: "run pending migrations".to_string(),
                source: anyhow::anyhow!("migration harness: {}", e),
            })?;

        Ok::<_, AppError>(applied.iter().map(ToString::to_string).collect::<Vec<_>>())
    })
    .await
    .map_err(|e| AppError::Internal {
        source: anyhow::Error::from(e),
    })??;

    Ok(applied)
}
