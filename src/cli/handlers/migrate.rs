//! Migrate command handler.
//!
//! Applies, previews and rolls back the embedded migrations over a
//! blocking `PgConnection` (the migration harness is synchronous).

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::MigrationHarness;

use crate::config::settings::Settings;
use crate::db::MIGRATIONS;
use crate::error::{AppError, AppResult};

pub struct MigrateCommandHandler {
    settings: Settings,
}

impl MigrateCommandHandler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Runs the requested migration operation.
    ///
    /// `--dry-run` previews pending migrations, `--rollback N` reverts the
    /// last `N`, and the bare command applies everything pending.
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        self.settings.database.validate()?;

        if dry_run {
            return self.preview_pending().await;
        }

        match rollback {
            Some(steps) => self.rollback(steps).await,
            None => self.apply_pending().await,
        }
    }

    /// Lists pending migrations without applying them.
    async fn preview_pending(&self) -> AppResult<()> {
        println!("Inspecting pending migrations...");

        let pending = self
            .with_blocking_connection("preview migrations", |conn| {
                let pending = conn.pending_migrations(MIGRATIONS).map_err(|e| {
                    AppError::Database {
                        operation: "preview migrations".to_string(),
                        source: anyhow::anyhow!("migration harness: {}", e),
                    }
                })?;
                Ok(pending.iter().map(|m| m.name().to_string()).collect::<Vec<_>>())
            })
            .await?;

        if pending.is_empty() {
            println!("✓ Database is up to date");
        } else {
            println!("Found {} pending migration(s):", pending.len());
            for name in &pending {
                println!("  - {}", name);
            }
            println!("\nRun without --dry-run to apply them");
        }

        Ok(())
    }

    /// Applies every pending migration.
    async fn apply_pending(&self) -> AppResult<()> {
        println!("Applying database migrations...");

        let applied = crate::db::run_pending_migrations(&self.settings.database.url).await?;

        if applied.is_empty() {
            println!("✓ Database is already up to date");
        } else {
            println!("✓ Applied {} migration(s):", applied.len());
            for name in &applied {
                println!("  - {}", name);
            }
        }

        Ok(())
    }

    /// Reverts the last `steps` applied migrations, newest first.
    async fn rollback(&self, steps: u32) -> AppResult<()> {
        if steps == 0 {
            return Err(AppError::Validation {
                field: "rollback_steps".to_string(),
                reason: "Rollback steps must be at least 1".to_string(),
            });
        }

        println!("Reverting {} migration(s)...", steps);

        let reverted = self
            .with_blocking_connection("revert migrations", move |conn| {
                let applied = conn.applied_migrations().map_err(|e| AppError::Database {
                    operation: "list applied migrations".to_string(),
                    source: anyhow::anyhow!("migration harness: {}", e),
                })?;

                if applied.len() < steps as usize {
                    return Err(AppError::Validation {
                        field: "rollback_steps".to_string(),
                        reason: format!(
                            "Cannot revert {} migrations, only {} are applied",
                            steps,
                            applied.len()
                        ),
                    });
                }

                let mut reverted = Vec::with_capacity(steps as usize);
                for _ in 0..steps {
                    let version =
                        conn.revert_last_migration(MIGRATIONS)
                            .map_err(|e| AppError::Database {
                                operation: "revert last migration".to_string(),
                                source: anyhow::anyhow!("rollback failed: {}", e),
                            })?;
                    reverted.push(version.to_string());
                }
                Ok(reverted)
            })
            .await?;

        println!("✓ Reverted {} migration(s):", reverted.len());
        for version in &reverted {
            println!("  - {}", version);
        }

        Ok(())
    }

    /// Establishes a blocking connection and hands it to `f` on the
    /// blocking pool.
    async fn with_blocking_connection<T, F>(&self, operation: &'static str, f: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> AppResult<T> + Send + 'static,
    {
        let database_url = self.settings.database.url.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn =
                PgConnection::establish(&database_url).map_err(|e| AppError::Database {
                    operation: operation.to_string(),
                    source: anyhow::anyhow!("could not connect: {}", e),
                })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| AppError::Internal {
            source: anyhow::Error::from(e),
        })?
    }

    pub fn config(&self) -> &Settings {
        &self.settings
    }
}
