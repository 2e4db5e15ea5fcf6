//! Dispatches parsed CLI commands to their handlers.

use tracing::warn;

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;
use crate::error::{AppError, AppResult};

/// Runs the command selected on the command line.
///
/// A plain `serve` (and the bare invocation) returns `Ok(())` without doing
/// anything; server startup stays in `main` so the runtime owns the
/// listener. Every other command completes here.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    preflight(cli)?;

    match &cli.command {
        None | Some(Commands::Serve { dry_run: false, .. }) => Ok(()),
        Some(Commands::Serve { dry_run: true, .. }) => {
            ServeCommandHandler::new(settings).execute(true).await
        }
        Some(Commands::Migrate { dry_run, rollback }) => {
            MigrateCommandHandler::new(settings)
                .execute(*dry_run, *rollback)
                .await
        }
    }
}

/// Rejects invalid argument combinations and logs advisories for legal but
/// surprising ones.
fn preflight(cli: &Cli) -> AppResult<()> {
    cli.validate().map_err(|reason| AppError::Validation {
        field: "cli_arguments".to_string(),
        reason,
    })?;

    match &cli.command {
        Some(Commands::Serve { host, port, .. }) => {
            // 0.0.0.0 on a privileged port is already a hard error in
            // Cli::validate; other binds below 1024 still need root
            if let Some(port) = *port
                && port < 1024
            {
                warn!(
                    port,
                    host = host.as_deref().unwrap_or("127.0.0.1"),
                    "Binding a privileged port usually requires elevated privileges"
                );
            }
        }
        Some(Commands::Migrate {
            rollback: Some(steps),
            ..
        }) if *steps > 50 => {
            warn!(
                steps = *steps,
                "Deep rollback requested; prefer smaller batches"
            );
        }
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn settings_with_db() -> Settings {
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/brigade_test".to_string();
        settings
    }

    #[tokio::test]
    async fn test_serve_dry_run_completes() {
        let cli = Cli::try_parse_from(["brigade", "serve", "--dry-run"]).unwrap();
        let result = execute_command(&cli, settings_with_db()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_plain_serve_defers_to_main() {
        let cli = Cli::try_parse_from(["brigade", "serve"]).unwrap();
        let result = execute_command(&cli, settings_with_db()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_bare_invocation_defers_to_main() {
        let cli = Cli::try_parse_from(["brigade"]).unwrap();
        let result = execute_command(&cli, settings_with_db()).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_preflight_accepts_port_override() {
        let cli = Cli::try_parse_from(["brigade", "serve", "--port", "8080"]).unwrap();
        assert!(preflight(&cli).is_ok());
    }

    #[test]
    fn test_preflight_rejects_dry_run_rollback_mix() {
        let cli = Cli {
            command: Some(Commands::Migrate {
                dry_run: true,
                rollback: Some(5),
            }),
            config: None,
            env: None,
            verbose: false,
            quiet: false,
        };
        assert!(preflight(&cli).is_err());
    }
}
