//! HRMS CLI - a command line front-end for the HRMS Lite backend.
//!
//! Lists, creates and deletes employees, marks attendance and shows the
//! dashboard counts. `hrms shell` keeps one client (and its response cache)
//! alive across commands.

mod commands;
mod output;
mod shell;

use std::io;

use anyhow::Result;
use clap::Parser;
use hrms_core::{ApiClient, ApiError, Config};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Command;

#[derive(Parser, Debug)]
#[command(name = "hrms")]
#[command(about = "Command line client for HRMS Lite")]
#[command(version)]
struct Args {
    /// Backend base URL (overrides config file and HRMS_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {}", describe_error(&e));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(url) = args.base_url {
        config.base_url = Some(url);
    }

    let client = ApiClient::from_config(&config)?;
    info!(base_url = client.base_url(), "HRMS client ready");

    match args.command {
        Command::Shell => shell::run(&client).await,
        command => commands::execute(&client, command).await,
    }
}

/// Prefer the backend's `detail` message for API failures
pub(crate) fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api_err) => api_err.user_message(&api_err.to_string()),
        None => format!("{:#}", err),
    }
}
