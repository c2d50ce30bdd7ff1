mod fetch;
mod run;

use tickcast_core::{FallbackSource, SeriesSource, SyntheticConfig, SyntheticSource, YahooSource};
use tickcast_ml::PipelineReport;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub use fetch::SeriesOverview;

pub enum CommandOutput {
    Report(Box<PipelineReport>),
    Series(SeriesOverview),
}

pub fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    match &cli.command {
        Command::Run(args) => run::run(args).map(|report| CommandOutput::Report(Box::new(report))),
        Command::Fetch(args) => fetch::run(args).map(CommandOutput::Series),
    }
}

/// Yahoo with a synthetic fallback, or synthetic only when offline.
fn build_source(
    offline: bool,
    timeout_ms: u64,
    synthetic: SyntheticConfig,
) -> Box<dyn SeriesSource> {
    let synthetic = SyntheticSource::new(synthetic);
    if offline {
        debug!("offline mode, using synthetic series only");
        return Box::new(synthetic);
    }
    let yahoo = YahooSource::default().with_timeout_ms(timeout_ms);
    Box::new(FallbackSource::new(yahoo, synthetic))
}
