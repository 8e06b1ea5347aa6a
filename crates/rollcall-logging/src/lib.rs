//! Logging setup for rollcall
//!
//! Builds a global `tracing` subscriber from a [`LogConfig`]: JSON lines or
//! pretty output on the console, and optionally a rolling file written
//! through a non-blocking appender.
//!
//! ```ignore
//! use rollcall_logging::{LogConfig, SubscriberBuilder};
//!
//! // Keep the guard alive for the lifetime of the process
//! let _guard = SubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init()?;
//! ```

pub mod config;

pub use config::{ConsoleConfig, FileConfig, LogConfig, RotationStrategy};
pub use tracing_appender::non_blocking::WorkerGuard;

use std::fs;

use thiserror::Error;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt};

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to prepare log directory: {0}")]
    Directory(#[from] std::io::Error),

    #[error("failed to open log file: {0}")]
    Appender(String),

    #[error("failed to install global subscriber: {0}")]
    Install(String),
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Builder for configuring and initializing the rollcall logging subscriber
#[derive(Debug, Default)]
pub struct SubscriberBuilder {
    config: LogConfig,
}

impl SubscriberBuilder {
    /// Default configuration: JSON lines to console at `info`
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Switch console output between pretty and JSON lines
    pub fn with_pretty_console(mut self, pretty: bool) -> Self {
        self.config.console.pretty = pretty;
        self.config.console.ansi = pretty;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Install the subscriber globally
    ///
    /// Returns the file writer guard when file output is enabled; dropping it
    /// flushes and stops the background writer.
    pub fn init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.config.default_level));

        let mut layers: Vec<BoxedLayer> = Vec::new();

        if self.config.console.enabled {
            layers.push(console_layer(&self.config.console));
        }

        let guard = match &self.config.file {
            Some(file_config) => {
                let (layer, guard) = file_layer(file_config)?;
                layers.push(layer);
                Some(guard)
            }
            None => None,
        };

        Registry::default()
            .with(layers)
            .with(env_filter)
            .try_init()
            .map_err(|e| LoggingError::Install(e.to_string()))?;

        Ok(guard)
    }
}

fn console_layer(config: &ConsoleConfig) -> BoxedLayer {
    if config.pretty {
        tracing_subscriber::fmt::layer()
            .with_ansi(config.ansi)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .flatten_event(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    }
}

fn file_layer(config: &FileConfig) -> Result<(BoxedLayer, WorkerGuard), LoggingError> {
    fs::create_dir_all(&config.directory)?;

    let rotation = match config.rotation {
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
        RotationStrategy::Never => Rotation::NEVER,
    };
    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(config.prefix.as_str())
        .build(&config.directory)
        .map_err(|e| LoggingError::Appender(e.to_string()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .flatten_event(true)
        .with_ansi(false)
        .with_writer(non_blocking)
        .boxed();

    Ok((layer, guard))
}
