//! Serve command handler.

use crate::config::settings::Settings;
use crate::error::AppResult;

/// Handler for the serve command.
///
/// A real serve run is driven by `main`; this handler implements the
/// `--dry-run` report so operators can vet a configuration before
/// deploying it.
pub struct ServeCommandHandler {
    settings: Settings,
}

impl ServeCommandHandler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Execute the serve command, reporting instead of binding when
    /// `dry_run` is set.
    pub async fn execute(&self, dry_run: bool) -> AppResult<()> {
        if dry_run { self.dry_run_report() } else { Ok(()) }
    }

    /// Validates the configuration and prints what a real run would do.
    fn dry_run_report(&self) -> AppResult<()> {
        self.settings.validate()?;

        println!("✓ Configuration validates");
        println!("✓ Server would bind to {}", self.settings.server.address());
        println!(
            "✓ Database pool: {}..{} connections, auto-migrate {}",
            self.settings.database.min_connections,
            self.settings.database.max_connections,
            if self.settings.database.auto_migrate {
                "on"
            } else {
                "off"
            },
        );
        println!(
            "✓ Access tokens: {} characters, expire after {} hours",
            self.settings.auth.token_length, self.settings.auth.access_token_expiration
        );
        let sinks = match (
            self.settings.logger.console.enabled,
            self.settings.logger.file.enabled,
        ) {
            (true, true) => "console and file",
            (true, false) => "console",
            (false, true) => "file",
            (false, false) => "nothing",
        };
        println!("✓ Logging to {}", sinks);
        println!("Dry run complete; configuration is ready");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.settings
    }
}
