use std::fmt::Write as _;

use serde::Serialize;
use tickcast_ml::{Metrics, PipelineReport};

use crate::cli::OutputFormat;
use crate::commands::{CommandOutput, SeriesOverview};
use crate::error::CliError;

pub fn render(output: &CommandOutput, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let text = match (output, format) {
        (CommandOutput::Report(report), OutputFormat::Json) => to_json(&**report, pretty)?,
        (CommandOutput::Series(overview), OutputFormat::Json) => to_json(overview, pretty)?,
        (CommandOutput::Report(report), OutputFormat::Table) => report_table(report),
        (CommandOutput::Series(overview), OutputFormat::Table) => series_table(overview),
    };
    println!("{}", text.trim_end());
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn format_mape(metrics: &Metrics) -> String {
    match metrics.mape {
        Some(mape) if metrics.mape_excluded > 0 => {
            format!("{mape:.2}% ({} zero skipped)", metrics.mape_excluded)
        }
        Some(mape) => format!("{mape:.2}%"),
        None => String::from("n/a"),
    }
}

pub fn report_table(report: &PipelineReport) -> String {
    let mut out = String::new();
    let training = &report.training;
    let series = &report.training_series;
    let units = if report.config.metrics_in_price_units {
        "price"
    } else {
        "normalized"
    };

    let _ = writeln!(out, "run_id      : {}", report.run_id);
    let _ = writeln!(out, "started_at  : {}", report.started_at);
    let _ = writeln!(out, "elapsed_ms  : {}", report.elapsed_ms);
    let _ = writeln!(
        out,
        "window      : size={} overlap={} steps={} split={}",
        report.config.window.window_size,
        report.config.window.overlap,
        report.config.window.prediction_steps,
        report.config.split_ratio
    );
    let _ = writeln!(
        out,
        "training    : {} {} ({} points{}, {} windows)",
        series.symbol,
        series.range,
        series.points,
        if series.synthetic { ", synthetic" } else { "" },
        series.windows
    );
    let _ = writeln!(
        out,
        "model       : {} epochs={} best_epoch={} best_{}={:.6}",
        report.model, training.epochs_run, training.best_epoch, training.monitored,
        training.best_loss
    );
    let _ = writeln!(out, "metrics     : {units} units");
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "{:<10} {:>8} {:>12} {:>12} {:>12} {:>24} {:>9}",
        "label", "samples", "rmse", "mae", "mse", "mape", "r2"
    );
    for metrics in &report.metrics {
        let _ = writeln!(
            out,
            "{:<10} {:>8} {:>12.6} {:>12.6} {:>12.6} {:>24} {:>9.4}",
            metrics.label,
            metrics.samples,
            metrics.rmse,
            metrics.mae,
            metrics.mse,
            format_mape(metrics),
            metrics.r2
        );
    }

    for summary in report.evaluated.iter().filter(|s| s.synthetic) {
        let _ = writeln!(out, "note: {} used synthetic data", summary.label);
    }
    for skipped in &report.skipped {
        let _ = writeln!(out, "skipped: {} ({}): {}", skipped.label, skipped.symbol, skipped.reason);
    }

    let _ = writeln!(out);
    match report.best_metrics() {
        Some(best) => {
            let _ = writeln!(out, "best performer: {} (rmse {:.6})", best.label, best.rmse);
        }
        None => {
            let _ = writeln!(out, "best performer: none (no target evaluated)");
        }
    }
    out
}

pub fn series_table(overview: &SeriesOverview) -> String {
    let mut out = String::new();
    let optional = |value: Option<String>| value.unwrap_or_else(|| String::from("-"));

    let _ = writeln!(out, "symbol    : {}", overview.symbol);
    let _ = writeln!(out, "range     : {}", overview.range);
    let _ = writeln!(out, "interval  : {}", overview.interval);
    let _ = writeln!(out, "points    : {}", overview.points);
    let _ = writeln!(out, "synthetic : {}", overview.synthetic);
    let _ = writeln!(out, "first     : {}", optional(overview.first.map(|ts| ts.to_string())));
    let _ = writeln!(out, "last      : {}", optional(overview.last.map(|ts| ts.to_string())));
    let _ = writeln!(out, "min       : {}", optional(overview.min.map(|v| format!("{v:.4}"))));
    let _ = writeln!(out, "max       : {}", optional(overview.max.map(|v| format!("{v:.4}"))));
    out
}
