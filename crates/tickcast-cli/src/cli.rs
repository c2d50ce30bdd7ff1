//! CLI argument definitions for tickcast.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `run` | Train a model and evaluate it on every target |
//! | `fetch` | Fetch (or synthesise) one series and summarise it |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--log-level` | `info` | Log filter when `RUST_LOG` is unset |
//!
//! # Examples
//!
//! ```bash
//! # Reference run, synthetic data only
//! tickcast run --offline
//!
//! # Smaller windows, JSON report
//! tickcast --format json run --window-size 20 --overlap 15 --prediction-steps 5
//!
//! # Inspect a series
//! tickcast fetch TCS.NS --start 2014-10-16 --end 2014-11-28
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Sliding-window stock price forecasting.
#[derive(Debug, Parser)]
#[command(
    name = "tickcast",
    author,
    version,
    about = "Sliding-window stock price forecasting"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log filter used when RUST_LOG is unset (e.g. debug, tickcast_ml=trace).
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary table.
    Table,
    /// Single JSON document.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelChoice {
    /// Multi-output linear regressor trained by gradient descent.
    Linear,
    /// Compounding trend baseline.
    Trend,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Train on the training series, then evaluate every target.
    ///
    /// # Examples
    ///
    ///   tickcast run --offline
    ///   tickcast run --config run.json --seed 7
    ///   tickcast run --symbols INFY.NS,WIPRO.NS --eval-start 2014-10-16 --eval-end 2014-11-28
    Run(RunArgs),

    /// Fetch one series and print a summary.
    ///
    /// # Examples
    ///
    ///   tickcast fetch INFY.NS --start 2014-07-01 --end 2014-10-14
    ///   tickcast fetch CIPLA.NS --start 2014-10-16 --end 2014-11-28 --offline
    Fetch(FetchArgs),
}

/// Arguments for the `run` command. Flags override the config file.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// JSON configuration file; missing fields take their defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip the network and use synthetic series only.
    #[arg(long, default_value_t = false)]
    pub offline: bool,

    #[arg(long, value_enum)]
    pub model: Option<ModelChoice>,

    /// Series interval (1d or 1m).
    #[arg(long)]
    pub interval: Option<String>,

    #[arg(long)]
    pub window_size: Option<usize>,

    #[arg(long)]
    pub overlap: Option<usize>,

    #[arg(long)]
    pub prediction_steps: Option<usize>,

    /// Share of training windows used for fitting, in (0, 1].
    #[arg(long)]
    pub split_ratio: Option<f64>,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub train_symbol: Option<String>,

    /// Training range start (YYYY-MM-DD).
    #[arg(long)]
    pub train_start: Option<String>,

    /// Training range end, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub train_end: Option<String>,

    /// Evaluation symbols, comma separated; labels are the symbol roots.
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    #[arg(long)]
    pub eval_start: Option<String>,

    #[arg(long)]
    pub eval_end: Option<String>,

    #[arg(long)]
    pub epochs: Option<usize>,

    #[arg(long)]
    pub batch_size: Option<usize>,

    #[arg(long)]
    pub patience: Option<usize>,

    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Per-request upstream timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Score forecasts in price units instead of normalized units.
    #[arg(long, default_value_t = false)]
    pub price_units: bool,
}

/// Arguments for the `fetch` command.
#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Market symbol (e.g. INFY.NS).
    pub symbol: String,

    /// Range start (YYYY-MM-DD).
    #[arg(long)]
    pub start: String,

    /// Range end, inclusive (YYYY-MM-DD).
    #[arg(long)]
    pub end: String,

    #[arg(long, default_value = "1d")]
    pub interval: String,

    #[arg(long, default_value_t = false)]
    pub offline: bool,

    /// Seed for the synthetic fallback.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = tickcast_core::DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,
}
