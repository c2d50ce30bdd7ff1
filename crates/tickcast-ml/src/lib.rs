//! # Tickcast ML
//!
//! Sliding-window forecasting on top of [`tickcast_core`] series.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`normalize`] | Min/max scaling with retained fit parameters |
//! | [`window`] | `WindowGenerator`, `Dataset` and chronological splits |
//! | [`predictor`] | `Predictor` trait, linear and trend models |
//! | [`evaluate`] | MSE, RMSE, MAE, MAPE, R² and the results store |
//! | [`config`] | `PipelineConfig` with JSON loading |
//! | [`pipeline`] | Orchestration and `PipelineReport` |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tickcast_core::SyntheticSource;
//! use tickcast_ml::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::default();
//! let source = SyntheticSource::new(config.synthetic_config());
//! let mut model = config.model.build(config.seed)?;
//! let report = Pipeline::new(config)?.run(&source, model.as_mut())?;
//! println!("best: {:?}", report.best);
//! ```

pub mod config;
pub mod error;
pub mod evaluate;
pub mod normalize;
pub mod pipeline;
pub mod predictor;
pub mod window;

pub use config::{PipelineConfig, SourceConfig, TargetSpec};
pub use error::ForecastError;
pub use evaluate::{compute_metrics, EvaluationResults, Evaluator, Metrics};
pub use normalize::{fit_transform, fit_transform_series, NormalizedSeries, ScaleParams};
pub use pipeline::{Pipeline, PipelineReport, SeriesSummary, SkippedTarget};
pub use predictor::{
    LinearConfig, LinearRegressor, ModelConfig, ModelKind, Monitor, Predictor, TrainingSummary,
    TrendModel,
};
pub use window::{Dataset, Sample, WindowConfig, WindowGenerator};
