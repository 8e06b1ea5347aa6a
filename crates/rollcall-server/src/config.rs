//! Server configuration
//!
//! Values come from, in increasing precedence: built-in defaults, an
//! optional TOML file, then CLI flags (each flag can also be set through
//! its environment variable).

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use rollcall_logging::LogConfig;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

#[derive(Parser)]
#[command(name = "rollcall", about = "Live check-in board server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the check-in board
    Serve(ServeArgs),
    /// Load the data file and directory, report, and exit
    Check(ServeArgs),
}

impl Command {
    pub fn args(&self) -> &ServeArgs {
        match self {
            Self::Serve(args) | Self::Check(args) => args,
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(long, env = "ROLLCALL_CONFIG")]
    pub config: Option<PathBuf>,
    /// Address to listen on
    #[arg(long, env = "ROLLCALL_BIND")]
    pub bind: Option<SocketAddr>,
    /// Durable check-in log (JSON)
    #[arg(long, env = "ROLLCALL_DATA_FILE")]
    pub data_file: Option<PathBuf>,
    /// Directory holding index.html and log.html
    #[arg(long, env = "ROLLCALL_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
    /// Roster file of {"userId", "name"} records
    #[arg(long, env = "ROLLCALL_ROSTER", conflicts_with = "directory_url")]
    pub roster: Option<PathBuf>,
    /// Base URL of an HTTP directory service
    #[arg(long, env = "ROLLCALL_DIRECTORY_URL")]
    pub directory_url: Option<String>,
    /// Directory lookup timeout in milliseconds
    #[arg(long, env = "ROLLCALL_RESOLVER_TIMEOUT_MS")]
    pub resolver_timeout_ms: Option<u64>,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ROLLCALL_LOG_LEVEL")]
    pub log_level: Option<String>,
    /// Human-readable console logs instead of JSON lines
    #[arg(long)]
    pub pretty: bool,
}

/// Where display names come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DirectoryConfig {
    Roster { path: PathBuf },
    Http { url: String },
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self::Roster {
            path: PathBuf::from("roster.json"),
        }
    }
}

/// Fully resolved server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub data_file: PathBuf,
    pub static_dir: PathBuf,
    pub directory: DirectoryConfig,
    pub resolver_timeout_ms: u64,
    pub logging: LogConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            data_file: PathBuf::from("user_log.json"),
            static_dir: PathBuf::from("static"),
            directory: DirectoryConfig::default(),
            resolver_timeout_ms: 3000,
            logging: LogConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ServerError> {
        toml::from_str(raw).map_err(|e| ServerError::config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ServerError::config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Defaults, then the config file named by `args`, then flag overrides
    pub fn resolve(args: &ServeArgs) -> Result<Self, ServerError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply(args);
        config.validate()?;
        Ok(config)
    }

    fn apply(&mut self, args: &ServeArgs) {
        if let Some(bind) = args.bind {
            self.bind = bind;
        }
        if let Some(path) = &args.data_file {
            self.data_file = path.clone();
        }
        if let Some(path) = &args.static_dir {
            self.static_dir = path.clone();
        }
        if let Some(path) = &args.roster {
            self.directory = DirectoryConfig::Roster { path: path.clone() };
        }
        if let Some(url) = &args.directory_url {
            self.directory = DirectoryConfig::Http { url: url.clone() };
        }
        if let Some(ms) = args.resolver_timeout_ms {
            self.resolver_timeout_ms = ms;
        }
        if let Some(level) = &args.log_level {
            self.logging.default_level = level.clone();
        }
        if args.pretty {
            self.logging.console.pretty = true;
            self.logging.console.ansi = true;
        }
    }

    fn validate(&self) -> Result<(), ServerError> {
        if self.resolver_timeout_ms == 0 {
            return Err(ServerError::config("resolver_timeout_ms must be positive"));
        }
        if self.data_file.as_os_str().is_empty() {
            return Err(ServerError::config("data_file must not be empty"));
        }
        Ok(())
    }

    pub fn resolver_timeout(&self) -> Duration {
        Duration::from_millis(self.resolver_timeout_ms)
    }
}
