//! Weather forecast inference bridge
//!
//! Invoked once per request by an external service: reads one JSON payload
//! from stdin, writes exactly one JSON line to stdout and exits zero. On
//! any failure nothing is written to stdout, a one-line diagnostic goes to
//! stderr and the exit code names the failure category.

use anyhow::Result;
use clap::{Parser, Subcommand};
use crate::config::{ForecastConfig, LogFormat, Overrides};
use forecast_lib::ForecastError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;

/// Weather forecast inference: JSON on stdin, JSON on stdout
#[derive(Parser)]
#[command(name = "forecast")]
#[command(author, version, about = "Weather forecast inference bridge", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML)
    #[arg(long, global = true, env = "FORECAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Point model artifact (.json forest or .onnx)
    #[arg(long, global = true)]
    pub point_model: Option<PathBuf>,

    /// Sequence model artifact (.json recurrent network or .onnx)
    #[arg(long, global = true)]
    pub sequence_model: Option<PathBuf>,

    /// Scaler artifact fitted with the sequence model
    #[arg(long, global = true)]
    pub scaler: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. warn, info, debug)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format on stderr
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict temperature and rainfall from one observation object
    Point,

    /// Predict next-day temperature from an array of seven daily observations
    Sequence,

    /// Load every configured artifact and print their fingerprints
    Check,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            point_model: self.point_model.clone(),
            sequence_model: self.sequence_model.clone(),
            scaler: self.scaler.clone(),
            log_level: self.log_level.clone(),
            log_format: self.log_format,
        }
    }
}

fn init_tracing(config: &ForecastConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries the prediction only
    match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<ForecastError>()
        .map(ForecastError::exit_code)
        .unwrap_or(1)
}

fn run(cli: Cli) -> Result<()> {
    let config = ForecastConfig::load(cli.config.as_deref())?.with_overrides(cli.overrides());
    init_tracing(&config);

    match cli.command {
        Commands::Point => commands::point::run(&config),
        Commands::Sequence => commands::sequence::run(&config),
        Commands::Check => commands::check::run(&config),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}
