//! OAuth Exchange Worker
//!
//! Builds provider login URLs and exchanges callback codes for user profiles.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde_json::Value;
use tracing::{error, info};

use oauth_exchange_worker::{
    cli::{Cli, Command},
    config::Config,
    oauth::OAuthClient,
    operation::{CONSTRUCT_OAUTH_URL, GET_SERVICE_TYPE, GET_USER_INFO, OperationRegistry},
    setup_tracing,
    worker::Worker,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup tracing
    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    match cli.command {
        Some(Command::Operations) => run_operations(),
        Some(Command::Call {
            ref operation,
            ref args,
        }) => run_call(&cli, operation, args).await,
        Some(Command::Serve) | None => run_server(&cli).await,
    }
}

/// Print the operation table
fn run_operations() -> ExitCode {
    for signature in [GET_SERVICE_TYPE, CONSTRUCT_OAUTH_URL, GET_USER_INFO] {
        println!("{signature}");
    }
    ExitCode::SUCCESS
}

/// Invoke a single operation and print the result
async fn run_call(cli: &Cli, operation: &str, args: &str) -> ExitCode {
    let Some(config) = load_config(cli) else {
        return ExitCode::FAILURE;
    };

    let args: Vec<Value> = match serde_json::from_str(args) {
        Ok(Value::Array(args)) => args,
        Ok(other) => {
            eprintln!("❌ Arguments must be a JSON array, got: {other}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("❌ Invalid JSON arguments: {e}");
            return ExitCode::FAILURE;
        }
    };

    let oauth = match OAuthClient::from_config(&config.http, Arc::new(config.oauth)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::FAILURE;
        }
    };
    let registry = OperationRegistry::with_defaults(Arc::new(oauth));

    match registry.dispatch(operation, &args, None).await {
        Ok(result) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&result).unwrap_or_default()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ {operation} failed: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run the worker server
async fn run_server(cli: &Cli) -> ExitCode {
    let Some(config) = load_config(cli) else {
        return ExitCode::FAILURE;
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.server.port,
        client_id = %config.oauth.client_id,
        "Starting OAuth exchange worker"
    );

    let worker = match Worker::new(config) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create worker: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = worker.run().await {
        error!("Worker error: {e}");
        return ExitCode::FAILURE;
    }

    info!("Worker shutdown complete");
    ExitCode::SUCCESS
}

/// Load configuration and apply CLI overrides
fn load_config(cli: &Cli) -> Option<Config> {
    match Config::load(Some(cli.config.as_path())) {
        Ok(mut config) => {
            if let Some(port) = cli.port {
                config.server.port = port;
            }
            if let Some(ref host) = cli.host {
                config.server.host = host.clone();
            }
            Some(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            None
        }
    }
}
