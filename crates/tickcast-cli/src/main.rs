mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::Cli;
use crate::error::CliError;

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(error) = run(&cli) {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let output = commands::run(cli)?;
    output::render(&output, cli.format, cli.pretty)
}
