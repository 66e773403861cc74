// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! sv - session vault CLI

mod commands;
mod error;
mod output;
mod stores;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{maintenance, session};
use output::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::error::SvError;

#[derive(Parser)]
#[command(name = "sv", version, about = "Session vault - client session storage")]
struct Cli {
    /// Storage root (defaults to the platform data directory)
    #[arg(long, global = true, env = "SV_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// TOML config file (defaults to <data-dir>/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a client's files
    Store(session::StoreArgs),
    /// Restore a client's files
    Load(session::LoadArgs),
    /// Delete a session and its overflow objects
    Delete(session::SessionArg),
    /// Check that a session can be reconstructed intact
    Verify(session::SessionArg),
    /// Delete sessions idle for too long
    Cleanup(maintenance::CleanupArgs),
    /// Summarize stored sessions
    Stats,
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<SvError>() {
                Some(sv) => eprint!("{sv}"),
                None => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let data_dir = cli.data_dir.map_or_else(stores::default_data_dir, Ok)?;
    let config_path = cli
        .config
        .unwrap_or_else(|| data_dir.join(stores::CONFIG_FILE));
    let vault = stores::open(&data_dir, &config_path)?;
    let format = cli.format;

    match cli.command {
        Commands::Store(args) => session::store(&vault, args, format).await,
        Commands::Load(args) => session::load(&vault, args, format).await,
        Commands::Delete(arg) => session::delete(&vault, arg, format).await,
        Commands::Verify(arg) => session::verify(&vault, arg, format).await,
        Commands::Cleanup(args) => maintenance::cleanup(&vault, args, format).await,
        Commands::Stats => maintenance::stats(&vault, format).await,
    }
}
