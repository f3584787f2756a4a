//! `pcf`: JSON command-line front end for the PCF engine.

mod commands;
mod json_types;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use pcf_engine::EngineConfig;
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use commands::print_pretty_json;
use json_types::ErrorJsonOutput;

#[derive(Parser, Debug)]
#[command(name = "pcf", version, about = "Evaluate, analyse and transform polynomial continued fractions")]
struct Cli {
    /// Engine configuration (TOML); defaults are used when missing
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log to stderr: -v for debug, -vv for trace (RUST_LOG otherwise)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Limit of the PCF at a given depth
    Limit(commands::limit::LimitArgs),
    /// Irrationality measure and convergence metrics
    Dynamics(commands::dynamics::DynamicsArgs),
    /// Polynomial, deflated and viable equivalent
    Normalize(commands::normalize::NormalizeArgs),
    /// Fold the PCF and transport its limit
    Fold(commands::fold::FoldArgs),
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();
}

fn emit<T: Serialize>(result: anyhow::Result<T>) -> ExitCode {
    match result {
        Ok(output) => {
            print_pretty_json(&output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            print_pretty_json(&ErrorJsonOutput::new(format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path),
        None => EngineConfig::default(),
    };
    tracing::debug!(?config, "engine configuration");

    match &cli.command {
        Command::Limit(args) => emit(commands::limit::run(args, &config)),
        Command::Dynamics(args) => emit(commands::dynamics::run(args, &config)),
        Command::Normalize(args) => emit(commands::normalize::run(args)),
        Command::Fold(args) => emit(commands::fold::run(args, &config)),
    }
}
