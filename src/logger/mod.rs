//! `tracing-subscriber` setup: a console sink, a daily-rotated file sink
//! in full, compact or JSON format, or both at once.

pub mod config;

pub use config::*;

use std::io::IsTerminal;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Installs the global subscriber described by `config`.
pub fn init_logger(config: LoggerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    // The file layer must be registered before the console layer: span
    // field formatting follows the first layer's ANSI setting, so the
    // other order leaks color codes into the log files.
    // See https://github.com/tokio-rs/tracing/issues/1817
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if config.file.enabled {
        layers.push(file_layer(&config.file));
    }
    if config.console.enabled {
        layers.push(console_layer(&config.console));
    }
    // validate() guarantees at least one sink is enabled

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .init();

    Ok(())
}

/// Console layer with ANSI colors only when stdout is a terminal.
fn console_layer(config: &ConsoleConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let use_ansi = config.colored && std::io::stdout().is_terminal();

    fmt::layer()
        .with_ansi(use_ansi)
        .with_target(true)
        .with_level(true)
        .boxed()
}

/// Daily-rotated file layer in the configured format.
fn file_layer(config: &FileConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let writer = RollingFileAppender::new(Rotation::DAILY, &config.directory, &config.filename);
    let base = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer);

    match config.format {
        LogFormat::Full => base.boxed(),
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Json => base.json().boxed(),
    }
}
