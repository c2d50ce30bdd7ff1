//! End-to-end run: fetch, normalize, window, split, train, evaluate, report.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tickcast_core::{SeriesRequest, SeriesSource, SourceError, TimeSeries, UtcDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{PipelineConfig, TargetSpec};
use crate::evaluate::{EvaluationResults, Evaluator, Metrics};
use crate::normalize::{fit_transform_series, ScaleParams};
use crate::predictor::{Predictor, TrainingSummary};
use crate::window::WindowGenerator;
use crate::ForecastError;

/// What was fetched and windowed for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub label: String,
    pub symbol: String,
    pub range: String,
    pub points: usize,
    pub synthetic: bool,
    pub windows: usize,
    pub scale: ScaleParams,
}

/// Evaluation target left out of the results, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTarget {
    pub label: String,
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: UtcDateTime,
    pub elapsed_ms: u64,
    pub model: String,
    pub config: PipelineConfig,
    pub training_series: SeriesSummary,
    pub training: TrainingSummary,
    pub evaluated: Vec<SeriesSummary>,
    pub metrics: EvaluationResults,
    pub skipped: Vec<SkippedTarget>,
    /// Label with the lowest RMSE.
    pub best: Option<String>,
}

impl PipelineReport {
    pub fn best_metrics(&self) -> Option<&Metrics> {
        self.best
            .as_deref()
            .and_then(|label| self.metrics.get(label))
    }
}

/// A validated run configuration bound to its window generator.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    generator: WindowGenerator,
}

impl Pipeline {
    /// Fails on any invalid setting before touching a data source.
    pub fn new(config: PipelineConfig) -> Result<Self, ForecastError> {
        config.validate()?;
        let generator = WindowGenerator::new(config.window)?;
        Ok(Self { config, generator })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Train `model` on the training target and score it on every
    /// evaluation target.
    ///
    /// # Errors
    ///
    /// Any failure on the training series is fatal. An evaluation target
    /// failing with a recoverable error is logged and reported in
    /// [`PipelineReport::skipped`]; other errors abort the run.
    pub fn run(
        &self,
        source: &dyn SeriesSource,
        model: &mut dyn Predictor,
    ) -> Result<PipelineReport, ForecastError> {
        let run_id = Uuid::new_v4();
        let started_at = UtcDateTime::now();
        let clock = Instant::now();
        info!(
            %run_id,
            model = model.name(),
            source = %source.id(),
            targets = self.config.evaluation.len(),
            "starting forecast pipeline"
        );

        let (training_series, training) = self.train(source, model)?;

        let mut evaluator = Evaluator::new();
        let mut evaluated = Vec::with_capacity(self.config.evaluation.len());
        let mut skipped = Vec::new();
        for target in &self.config.evaluation {
            match self.evaluate_target(source, &*model, &mut evaluator, target) {
                Ok(summary) => evaluated.push(summary),
                Err(error) if error.is_recoverable() => {
                    warn!(
                        label = %target.label,
                        symbol = %target.symbol,
                        start = %tickcast_core::format_date(target.start),
                        end = %tickcast_core::format_date(target.end),
                        reason = %error,
                        "skipping evaluation target"
                    );
                    skipped.push(SkippedTarget {
                        label: target.label.clone(),
                        symbol: target.symbol.clone(),
                        reason: error.to_string(),
                    });
                }
                Err(error) => return Err(error),
            }
        }

        let metrics = evaluator.into_results();
        let best = metrics.best_by_rmse().map(|m| m.label.clone());
        info!(
            %run_id,
            evaluated = metrics.len(),
            skipped = skipped.len(),
            best = best.as_deref().unwrap_or("none"),
            "pipeline finished"
        );

        Ok(PipelineReport {
            run_id,
            started_at,
            elapsed_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
            model: model.name().to_string(),
            config: self.config.clone(),
            training_series,
            training,
            evaluated,
            metrics,
            skipped,
            best,
        })
    }

    fn train(
        &self,
        source: &dyn SeriesSource,
        model: &mut dyn Predictor,
    ) -> Result<(SeriesSummary, TrainingSummary), ForecastError> {
        let target = &self.config.training;
        let request = target.request(self.config.interval)?;
        let series = fetch_non_empty(source, &target.label, &request)?;
        let normalized = fit_transform_series(&series)?;
        let dataset = self.generator.generate(&normalized.values)?;

        let (train, validation) = dataset.split_chronological(self.config.split_ratio)?;
        if train.is_empty() {
            return Err(ForecastError::NoTrainingWindows {
                total: dataset.len(),
                ratio: self.config.split_ratio,
            });
        }
        info!(
            train_windows = train.len(),
            validation_windows = validation.len(),
            window_size = dataset.window_size(),
            prediction_steps = dataset.prediction_steps(),
            "training model"
        );

        let training = model.train(&train, Some(&validation))?;
        info!(
            model = %training.model,
            epochs = training.epochs_run,
            best_epoch = training.best_epoch,
            best_loss = training.best_loss,
            monitored = %training.monitored,
            "training finished"
        );

        let summary = summarize(target, &request, &series, dataset.len(), normalized.params);
        Ok((summary, training))
    }

    fn evaluate_target(
        &self,
        source: &dyn SeriesSource,
        model: &dyn Predictor,
        evaluator: &mut Evaluator,
        target: &TargetSpec,
    ) -> Result<SeriesSummary, ForecastError> {
        let request = target.request(self.config.interval)?;
        let series = fetch_non_empty(source, &target.label, &request)?;
        let normalized = fit_transform_series(&series)?;
        let dataset = self.generator.generate(&normalized.values)?;

        let predicted = model.predict(dataset.inputs().view())?;
        let actual = dataset.targets();
        if self.config.metrics_in_price_units {
            let params = normalized.params;
            evaluator.evaluate(
                &params.inverse_array(&actual),
                &params.inverse_array(&predicted),
                &target.label,
            )?;
        } else {
            evaluator.evaluate(&actual, &predicted, &target.label)?;
        }

        Ok(summarize(target, &request, &series, dataset.len(), normalized.params))
    }
}

fn fetch_non_empty(
    source: &dyn SeriesSource,
    label: &str,
    request: &SeriesRequest,
) -> Result<TimeSeries, ForecastError> {
    let series = source.fetch(request)?;
    if series.is_empty() {
        return Err(SourceError::unavailable(format!(
            "no rows for {} in {}",
            request.symbol,
            request.range_label()
        ))
        .into());
    }
    info!(
        label,
        symbol = %request.symbol,
        range = %request.range_label(),
        points = series.len(),
        synthetic = series.is_synthetic(),
        "fetched series"
    );
    Ok(series)
}

fn summarize(
    target: &TargetSpec,
    request: &SeriesRequest,
    series: &TimeSeries,
    windows: usize,
    scale: ScaleParams,
) -> SeriesSummary {
    SeriesSummary {
        label: target.label.clone(),
        symbol: request.symbol.to_string(),
        range: request.range_label(),
        points: series.len(),
        synthetic: series.is_synthetic(),
        windows,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use tickcast_core::{SourceId, SyntheticSource};
    use time::macros::date;

    use super::*;
    use crate::predictor::{LinearConfig, LinearRegressor, TrendModel};
    use crate::window::WindowConfig;

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            window: WindowConfig::new(10, 5, 3),
            ..PipelineConfig::default()
        }
    }

    fn daily_source(config: &PipelineConfig) -> SyntheticSource {
        SyntheticSource::new(config.synthetic_config().with_granularity(None))
    }

    struct CountingSource {
        calls: Cell<usize>,
    }

    impl SeriesSource for CountingSource {
        fn id(&self) -> SourceId {
            SourceId::Synthetic
        }

        fn fetch(&self, req: &SeriesRequest) -> Result<TimeSeries, SourceError> {
            self.calls.set(self.calls.get() + 1);
            Ok(TimeSeries::empty(req.symbol.clone(), req.interval))
        }
    }

    #[test]
    fn runs_every_target_on_synthetic_data() {
        let config = small_config();
        let source = daily_source(&config);
        let pipeline = Pipeline::new(config).expect("valid config");
        let mut model = LinearRegressor::new(LinearConfig {
            epochs: 20,
            ..LinearConfig::default()
        });

        let report = pipeline.run(&source, &mut model).expect("pipeline succeeds");

        assert_eq!(report.metrics.labels(), vec!["INFY", "TCS", "CIPLA"]);
        assert!(report.skipped.is_empty());
        assert!(report.training_series.synthetic);
        assert_eq!(report.evaluated[0].points, 32);
        assert_eq!(report.evaluated[0].windows, 4);
        let best = report.best_metrics().expect("best exists");
        assert!(report.metrics.iter().all(|m| best.rmse <= m.rmse));
        assert_eq!(report.model, "linear");
    }

    #[test]
    fn short_target_is_skipped_not_fatal() {
        let mut config = small_config();
        config.evaluation.push(TargetSpec::new(
            "SHORT",
            "WIPRO.NS",
            date!(2014 - 11 - 24),
            date!(2014 - 11 - 28),
        ));
        let source = daily_source(&config);
        let pipeline = Pipeline::new(config).expect("valid config");

        let report = pipeline
            .run(&source, &mut TrendModel::default())
            .expect("pipeline succeeds");

        assert_eq!(report.metrics.len(), 3);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].label, "SHORT");
        assert!(report.skipped[0].reason.contains("insufficient data"));
    }

    #[test]
    fn empty_training_series_is_fatal() {
        let source = CountingSource {
            calls: Cell::new(0),
        };
        let pipeline = Pipeline::new(small_config()).expect("valid config");

        let err = pipeline
            .run(&source, &mut TrendModel::default())
            .expect_err("no training data");

        assert!(matches!(err, ForecastError::Source(_)));
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn invalid_config_is_rejected_before_any_fetch() {
        let mut config = small_config();
        config.window.overlap = 10;

        assert!(matches!(
            Pipeline::new(config),
            Err(ForecastError::Configuration(_))
        ));
    }

    #[test]
    fn price_unit_metrics_scale_with_prices() {
        let mut config = small_config();
        let source = daily_source(&config);
        let normalized = Pipeline::new(config.clone())
            .and_then(|p| p.run(&source, &mut TrendModel::default()))
            .expect("runs");
        config.metrics_in_price_units = true;
        let priced = Pipeline::new(config)
            .and_then(|p| p.run(&source, &mut TrendModel::default()))
            .expect("runs");

        let tcs = |report: &PipelineReport| report.metrics.get("TCS").map(|m| m.rmse);
        let summary = &priced.evaluated[1];
        let expected = tcs(&normalized).expect("scored") * summary.scale.range();
        let actual = tcs(&priced).expect("scored");
        assert!((actual - expected).abs() < 1e-6 * expected.max(1.0));
    }
}
