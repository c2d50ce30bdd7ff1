use std::str::FromStr;

use serde::Serialize;
use tickcast_core::{
    parse_date, Interval, SeriesRequest, Symbol, SyntheticConfig, TimeSeries, UtcDateTime,
};
use tickcast_ml::{ForecastError, ScaleParams};

use crate::cli::FetchArgs;
use crate::error::CliError;

use super::build_source;

/// Shape of one fetched series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesOverview {
    pub symbol: String,
    pub range: String,
    pub interval: Interval,
    pub points: usize,
    pub synthetic: bool,
    pub first: Option<UtcDateTime>,
    pub last: Option<UtcDateTime>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl SeriesOverview {
    fn new(request: &SeriesRequest, series: &TimeSeries) -> Self {
        let scale = ScaleParams::fit(&series.values()).ok();
        Self {
            symbol: series.symbol().to_string(),
            range: request.range_label(),
            interval: series.interval(),
            points: series.len(),
            synthetic: series.is_synthetic(),
            first: series.first().map(|point| point.ts),
            last: series.last().map(|point| point.ts),
            min: scale.map(|s| s.min),
            max: scale.map(|s| s.max),
        }
    }
}

pub fn run(args: &FetchArgs) -> Result<SeriesOverview, CliError> {
    if args.timeout_ms == 0 {
        return Err(CliError::Argument(String::from(
            "--timeout-ms must be greater than zero",
        )));
    }

    let symbol = Symbol::parse(&args.symbol)?;
    let interval = Interval::from_str(&args.interval)?;
    let request = SeriesRequest::new(
        symbol,
        parse_date(&args.start)?,
        parse_date(&args.end)?,
        interval,
    )?;

    let synthetic = SyntheticConfig::default().with_seed(args.seed);
    let source = build_source(args.offline, args.timeout_ms, synthetic);
    let series = source.fetch(&request).map_err(ForecastError::from)?;
    Ok(SeriesOverview::new(&request, &series))
}
