//! HTTP server lifecycle: startup, serving, graceful shutdown.

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::{Environment, settings::Settings};
use crate::db::{establish_async_connection_pool, run_pending_migrations};
use crate::state::AppState;

/// Owns the resolved settings and drives the server from startup through
/// graceful shutdown.
pub struct Server {
    settings: Settings,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Runs migrations (when enabled), builds the pool and state, binds the
    /// listener and serves until Ctrl+C or SIGTERM.
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = self.settings;

        tracing::info!(
            name = %settings.application.name,
            version = %settings.application.version,
            environment = %Environment::from_env().as_str(),
            "Starting brigade"
        );

        // The CLI path validates before handing settings over, but Server
        // can also be constructed directly
        settings
            .validate()
            .context("refusing to start with invalid configuration")?;

        tracing::debug!(
            address = %settings.server.address(),
            request_timeout = settings.server.request_timeout,
            keep_alive_timeout = settings.server.keep_alive_timeout,
            pool_min = settings.database.min_connections,
            pool_max = settings.database.max_connections,
            auto_migrate = settings.database.auto_migrate,
            log_level = %settings.logger.level,
            token_length = settings.auth.token_length,
            "Resolved configuration"
        );

        if settings.database.auto_migrate {
            let applied = run_pending_migrations(&settings.database.url).await?;
            match applied.len() {
                0 => tracing::info!("Database schema is up to date"),
                count => tracing::info!(count, "Applied pending migrations"),
            }
        }

        let pool = establish_async_connection_pool(&settings.database).await?;
        let state = AppState::new(pool, settings.auth.clone());
        let router = create_router(state);

        let address = settings.server.address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind to {address}"))?;
        tracing::info!(%address, "Server listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Shutdown complete");
        Ok(())
    }
}

/// Resolves when either Ctrl+C or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Ctrl+C handler should install");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler should install")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, shutting down");
        }
        _ = terminate => {
            tracing::info!("SIGTERM received, shutting down");
        }
    }
}
