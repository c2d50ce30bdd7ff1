use std::str::FromStr;

use tickcast_core::{parse_date, Interval, Symbol};
use tickcast_ml::{ModelKind, Pipeline, PipelineConfig, PipelineReport, TargetSpec};

use crate::cli::{ModelChoice, RunArgs};
use crate::error::CliError;

use super::build_source;

pub fn run(args: &RunArgs) -> Result<PipelineReport, CliError> {
    let config = resolve_config(args)?;
    let pipeline = Pipeline::new(config)?;

    let config = pipeline.config();
    let source = build_source(
        config.source.offline,
        config.source.timeout_ms,
        config.synthetic_config(),
    );
    let mut model = config.model.build(config.seed)?;

    Ok(pipeline.run(&*source, &mut *model)?)
}

/// Config file (or defaults) with command-line overrides applied.
fn resolve_config(args: &RunArgs) -> Result<PipelineConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };

    if args.offline {
        config.source.offline = true;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.source.timeout_ms = timeout_ms;
    }
    if let Some(choice) = args.model {
        config.model.kind = match choice {
            ModelChoice::Linear => ModelKind::Linear,
            ModelChoice::Trend => ModelKind::Trend,
        };
    }
    if let Some(interval) = &args.interval {
        config.interval = Interval::from_str(interval)?;
    }
    if let Some(window_size) = args.window_size {
        config.window.window_size = window_size;
    }
    if let Some(overlap) = args.overlap {
        config.window.overlap = overlap;
    }
    if let Some(prediction_steps) = args.prediction_steps {
        config.window.prediction_steps = prediction_steps;
    }
    if let Some(split_ratio) = args.split_ratio {
        config.split_ratio = split_ratio;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(epochs) = args.epochs {
        config.model.epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        config.model.batch_size = batch_size;
    }
    if let Some(patience) = args.patience {
        config.model.patience = patience;
    }
    if let Some(learning_rate) = args.learning_rate {
        config.model.learning_rate = learning_rate;
    }
    if args.price_units {
        config.metrics_in_price_units = true;
    }

    if let Some(raw) = &args.train_symbol {
        let symbol = Symbol::parse(raw)?;
        config.training.label = symbol.root().to_string();
        config.training.symbol = symbol.to_string();
    }
    if let Some(start) = &args.train_start {
        config.training.start = parse_date(start)?;
    }
    if let Some(end) = &args.train_end {
        config.training.end = parse_date(end)?;
    }

    if !args.symbols.is_empty() {
        let (start, end) = config
            .evaluation
            .first()
            .map_or((config.training.start, config.training.end), |t| {
                (t.start, t.end)
            });
        config.evaluation = args
            .symbols
            .iter()
            .map(|raw| {
                let symbol = Symbol::parse(raw)?;
                Ok(TargetSpec::new(
                    symbol.root(),
                    symbol.as_str(),
                    start,
                    end,
                ))
            })
            .collect::<Result<Vec<_>, CliError>>()?;
    }
    if let Some(start) = &args.eval_start {
        let start = parse_date(start)?;
        config.evaluation.iter_mut().for_each(|target| target.start = start);
    }
    if let Some(end) = &args.eval_end {
        let end = parse_date(end)?;
        config.evaluation.iter_mut().for_each(|target| target.end = end);
    }

    Ok(config)
}
