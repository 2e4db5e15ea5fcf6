//! Command-line interface definition.
//!
//! Clap derives the whole surface from these types; the value parsers in
//! [`super::validation`] reject bad arguments before any configuration is
//! loaded.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

// Build metadata baked in by shadow-rs for --version output
use shadow_rs::shadow;
shadow!(build);

/// An API server for managing projects across organizations
#[derive(Parser, Debug)]
#[command(name = "brigade")]
#[command(about = "An API server for managing projects across organizations")]
#[command(long_about = "
Brigade serves organization-scoped project CRUD endpoints behind OAuth2
bearer token authentication, backed by Postgres.

EXAMPLES:
    # Serve with the layered TOML configuration
    brigade serve

    # Bind to all interfaces on a custom port
    brigade serve --host 0.0.0.0 --port 8080

    # Check configuration without starting the server
    brigade serve --dry-run

    # Apply pending database migrations
    brigade migrate

    # Revert the two most recent migrations
    brigade migrate --rollback 2
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Load exactly this TOML file instead of the layered config
    /// directory. Must point at a readable file.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Force a specific environment instead of reading BRIGADE_APP_ENV.
    /// Decides which {environment}.toml layer is loaded.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Raise log output to debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Reduce log output to errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (the default when no subcommand is given)
    Serve {
        /// Interface to bind, e.g. 127.0.0.1 for local access or 0.0.0.0
        /// for all interfaces
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// TCP port to listen on (1-65535; ports below 1024 need root)
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level for this run; beats the config file and the global
        /// --verbose/--quiet flags
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit without binding
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply, preview or revert database schema migrations
    Migrate {
        /// List pending migrations without applying them
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Revert this many of the most recent migrations (1-100)
        #[arg(long, value_name = "STEPS", conflicts_with = "dry_run", value_parser = super::validation::validate_rollback_steps)]
        rollback: Option<u32>,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Cli {
    /// Cross-argument checks clap cannot express.
    ///
    /// Parsed invocations already satisfy the per-value parsers and the
    /// `conflicts_with` rules; this guards combinations of otherwise valid
    /// values, and hand-built `Cli` values in tests.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("--verbose and --quiet are mutually exclusive".to_string());
        }

        match &self.command {
            Some(Commands::Serve { host, port, .. }) => {
                if let Some(host) = host
                    && host == "0.0.0.0"
                    && port.is_some_and(|p| p < 1024)
                {
                    return Err(
                        "Binding 0.0.0.0 to a privileged port (< 1024) requires root privileges"
                            .to_string(),
                    );
                }
            }
            Some(Commands::Migrate { dry_run, rollback }) => {
                if *dry_run && rollback.is_some() {
                    return Err("--dry-run and --rollback are mutually exclusive".to_string());
                }
            }
            None => {}
        }

        Ok(())
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}
