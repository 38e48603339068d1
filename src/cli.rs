//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// OAuth2 authorization-code exchange worker
#[derive(Parser, Debug)]
#[command(name = "oauth-exchange-worker")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (JSON or YAML)
    #[arg(
        short,
        long,
        env = "OAUTH_WORKER_CONFIG",
        default_value = DEFAULT_CONFIG_PATH,
        global = true
    )]
    pub config: PathBuf,

    /// Port to listen on
    #[arg(short, long, env = "OAUTH_WORKER_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "OAUTH_WORKER_HOST")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        default_value = "info",
        env = "OAUTH_WORKER_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "OAUTH_WORKER_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand (optional - defaults to server mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the worker server (default)
    Serve,

    /// Invoke one operation and print its result as JSON
    Call {
        /// Operation name (e.g. `constructOAuthUrl`)
        #[arg(required = true)]
        operation: String,

        /// Positional arguments as a JSON array
        #[arg(short, long, default_value = "[]")]
        args: String,
    },

    /// List operations and their signatures
    Operations,
}
