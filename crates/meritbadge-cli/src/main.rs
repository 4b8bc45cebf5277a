//! meritbadge - validate and import Scoutbook exports from the command line.
//!
//! Checks youth roster, adult roster and merit badge progress CSV files,
//! imports the ones that pass into a local record database, and prints
//! views over the imported records.

mod cli;
mod commands;
mod report;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use meritbadge_core::Config;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Command};

/// Log file name prefix inside `--log-dir`
const LOG_FILE: &str = "meritbadge.log";

/// Initialize the tracing subscriber for logging.
///
/// The returned guard flushes the log file on drop and must outlive `main`'s work.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load()?;
    config.apply_env();
    if let Some(ref dir) = cli.database {
        config.database_path = Some(dir.clone());
    }
    debug!(database = ?config.database_path, "Loaded config");
    Ok(config)
}

fn exit_code(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_dir.as_deref());
    info!("meritbadge starting");

    let config = load_config(&cli)?;

    match &cli.command {
        Command::Validate(args) => Ok(exit_code(commands::run_validate(args, &config)?)),
        Command::Import(args) => Ok(exit_code(commands::run_import(args, &config)?)),
        Command::Show(view) => {
            commands::run_show(view, &config)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config(args) => {
            commands::run_config(args, cli.database.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
