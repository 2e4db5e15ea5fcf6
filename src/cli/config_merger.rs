//! Merges CLI argument overrides into file-based configuration.
//!
//! Precedence, lowest to highest: config files, `BRIGADE_*` environment
//! overrides (both applied by the loader), then CLI flags.

use std::path::Path;

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, settings::Settings};

/// Applies CLI overrides on top of loaded settings.
pub struct ConfigurationMerger {
    base: Settings,
}

impl ConfigurationMerger {
    pub fn new(base: Settings) -> Self {
        Self { base }
    }

    /// Loads settings from `--config FILE` when given, otherwise through
    /// the default loader chain.
    pub fn from_config_path(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match config_file {
            Some(path) => Self::load_explicit_file(path)?,
            None => ConfigLoader::new()?.load()?,
        };
        Ok(Self::new(settings))
    }

    /// Loads a single explicitly named configuration file.
    ///
    /// The loader reads the file name from `BRIGADE_CONFIG_FILE`; the
    /// variable is cleared again even when loading fails.
    fn load_explicit_file(path: &Path) -> Result<Settings, ConfigError> {
        check_readable(path)?;

        unsafe {
            std::env::set_var("BRIGADE_CONFIG_FILE", path);
        }
        let loaded = ConfigLoader::new().and_then(|loader| loader.load());
        unsafe {
            std::env::remove_var("BRIGADE_CONFIG_FILE");
        }
        loaded
    }

    /// Returns the base settings with CLI overrides applied, validated as
    /// a whole.
    pub fn merge(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut settings = self.base.clone();

        if cli.verbose {
            settings.logger.level = "debug".to_string();
        } else if cli.quiet {
            settings.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            ..
        }) = &cli.command
        {
            if let Some(host) = host {
                settings.server.host = host.clone();
            }
            if let Some(port) = port {
                settings.server.port = *port;
            }
            // --log-level on the subcommand beats --verbose/--quiet
            if let Some(level) = log_level {
                settings.logger.level = level.clone().into();
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn config(&self) -> &Settings {
        &self.base
    }
}

fn check_readable(path: &Path) -> Result<(), ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::validation(
            "config_file",
            format!("'{}' is not a readable file", path.display()),
        ));
    }
    std::fs::File::open(path).map(drop).map_err(|e| {
        ConfigError::validation("config_file", format!("cannot open '{}': {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parser::Cli;
    use clap::Parser;

    fn base_settings() -> Settings {
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/brigade_test".to_string();
        settings
    }

    #[test]
    fn test_merger_exposes_base() {
        let settings = Settings::default();
        let merger = ConfigurationMerger::new(settings.clone());
        assert_eq!(merger.config(), &settings);
    }

    #[test]
    fn test_verbose_flag_raises_verbosity() {
        let merger = ConfigurationMerger::new(base_settings());
        let cli = Cli::try_parse_from(["brigade", "--verbose"]).unwrap();

        let merged = merger.merge(&cli).unwrap();
        assert_eq!(merged.logger.level, "debug");
    }

    #[test]
    fn test_quiet_flag_silences_logging() {
        let merger = ConfigurationMerger::new(base_settings());
        let cli = Cli::try_parse_from(["brigade", "--quiet"]).unwrap();

        let merged = merger.merge(&cli).unwrap();
        assert_eq!(merged.logger.level, "error");
    }

    #[test]
    fn test_serve_host_override() {
        let merger = ConfigurationMerger::new(base_settings());
        let cli = Cli::try_parse_from(["brigade", "serve", "--host", "0.0.0.0"]).unwrap();

        let merged = merger.merge(&cli).unwrap();
        assert_eq!(merged.server.host, "0.0.0.0");
    }

    #[test]
    fn test_serve_port_override() {
        let merger = ConfigurationMerger::new(base_settings());
        let cli = Cli::try_parse_from(["brigade", "serve", "--port", "8080"]).unwrap();

        let merged = merger.merge(&cli).unwrap();
        assert_eq!(merged.server.port, 8080);
    }

    #[test]
    fn test_subcommand_log_level_beats_global_flags() {
        let merger = ConfigurationMerger::new(base_settings());
        let cli =
            Cli::try_parse_from(["brigade", "--verbose", "serve", "--log-level", "warn"]).unwrap();

        let merged = merger.merge(&cli).unwrap();
        assert_eq!(merged.logger.level, "warn");
    }
}
