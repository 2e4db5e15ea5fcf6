//! Logger configuration types

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;

/// Root logger configuration: one console sink, one file sink, and the
/// minimum level both share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub console: ConsoleConfig,
    pub file: FileConfig,
    pub level: String,
}

impl LoggerConfig {
    /// Builds a configuration, rejecting invalid combinations up front.
    pub fn new(console: ConsoleConfig, file: FileConfig, level: String) -> Result<Self> {
        let config = Self {
            console,
            file,
            level,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the level string, the file sink settings, and that at least
    /// one sink is enabled.
    pub fn validate(&self) -> Result<()> {
        self.parse_level()?;
        self.file.validate().context("Invalid file configuration")?;

        if !self.console.enabled && !self.file.enabled {
            anyhow::bail!("Logging requires at least one enabled sink (console or file)");
        }

        Ok(())
    }

    /// The configured level as a `tracing::Level`.
    ///
    /// Level names are matched case-insensitively.
    pub fn parse_level(&self) -> Result<Level> {
        self.level.parse::<Level>().map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level '{}'. Valid levels are: trace, debug, info, warn, error",
                self.level
            )
        })
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
            level: "info".to_string(),
        }
    }
}

/// Console sink settings. Color is a request, not a guarantee: ANSI is
/// still suppressed when stdout is not a terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub colored: bool,
}

impl ConsoleConfig {
    pub fn new(enabled: bool, colored: bool) -> Self {
        Self { enabled, colored }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
        }
    }
}

/// File sink settings.
///
/// Files are rotated daily by tracing-appender; `directory` holds the
/// rotated files and `filename` is the prefix each of them starts with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub enabled: bool,
    pub directory: PathBuf,
    pub filename: String,
    pub format: LogFormat,
}

impl FileConfig {
    pub fn new(
        enabled: bool,
        directory: PathBuf,
        filename: String,
        format: LogFormat,
    ) -> Result<Self> {
        let config = Self {
            enabled,
            directory,
            filename,
            format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Pure checks only; the appender creates the directory itself when
    /// logging starts.
    pub fn validate(&self) -> Result<()> {
        if self.enabled {
            if self.directory.as_os_str().is_empty() {
                anyhow::bail!("Log directory cannot be empty when file output is enabled");
            }
            if self.filename.trim().is_empty() {
                anyhow::bail!("Log filename cannot be empty when file output is enabled");
            }
        }
        Ok(())
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: PathBuf::from("logs"),
            filename: "brigade.log".to_string(),
            format: LogFormat::Json,
        }
    }
}

/// Line format for the file sink.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "full" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unknown log format '{}', expected full, compact or json", s),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogFormat::Full => "full",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        };
        write!(f, "{}", s)
    }
}
