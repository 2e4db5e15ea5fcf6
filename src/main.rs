use clap::Parser;

use brigade::cli::{Cli, Commands, execute_command, init_logger_from_settings, load_and_merge_config};
use brigade::config::Environment;
use brigade::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Apply --env before the configuration loader runs so it picks up the
    // matching environment-specific configuration file
    if let Some(env) = &cli.env {
        let environment: Environment = env.clone().into();
        unsafe {
            std::env::set_var(Environment::ENV_VAR, environment.as_str());
        }
    }

    let settings = load_and_merge_config(&cli)?;
    init_logger_from_settings(&settings)?;

    execute_command(&cli, settings.clone()).await?;

    // The executor handles migrate and dry-run commands itself; a plain
    // `serve` (or no subcommand at all) falls through to server startup here
    let should_serve = match &cli.command {
        None => true,
        Some(Commands::Serve { dry_run, .. }) => !*dry_run,
        Some(Commands::Migrate { .. }) => false,
    };

    if should_serve {
        Server::new(settings).run().await?;
    }

    Ok(())
}
