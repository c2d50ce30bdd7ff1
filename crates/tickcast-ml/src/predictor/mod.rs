//! Pluggable forecasting models.
//!
//! A [`Predictor`] learns a map from an input window (`window_size` values)
//! to a forecast of `prediction_steps` values. The windowing and evaluation
//! code only sees this trait, so any regression technique can be swapped in.

mod linear;
mod trend;

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::window::Dataset;
use crate::ForecastError;

pub use linear::{LinearConfig, LinearRegressor};
pub use trend::TrendModel;

/// Common contract for window-to-horizon models.
pub trait Predictor {
    fn name(&self) -> &str;

    /// Fit on `train`, monitoring `validation` when it has windows.
    ///
    /// Neither dataset is mutated.
    fn train(
        &mut self,
        train: &Dataset,
        validation: Option<&Dataset>,
    ) -> Result<TrainingSummary, ForecastError>;

    /// Forecast one row per input row.
    ///
    /// `inputs` must have the window size seen in `train`; the result has
    /// `prediction_steps` columns.
    fn predict(&self, inputs: ArrayView2<'_, f64>) -> Result<Array2<f64>, ForecastError>;

    fn is_trained(&self) -> bool;
}

/// Which loss early stopping watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Monitor {
    ValidationLoss,
    TrainingLoss,
}

impl Display for Monitor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ValidationLoss => "val_loss",
            Self::TrainingLoss => "loss",
        })
    }
}

/// Outcome of one `train` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub model: String,
    pub train_windows: usize,
    pub validation_windows: usize,
    pub epochs_run: usize,
    /// 1-based epoch whose weights were kept.
    pub best_epoch: usize,
    pub best_loss: f64,
    pub monitored: Monitor,
}

/// Shape a model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FittedShape {
    pub window_size: usize,
    pub prediction_steps: usize,
}

impl FittedShape {
    pub fn of(dataset: &Dataset) -> Self {
        Self {
            window_size: dataset.window_size(),
            prediction_steps: dataset.prediction_steps(),
        }
    }
}

/// Reject predictions before training or with a different window width.
pub(crate) fn check_inputs(
    model: &str,
    fitted: Option<FittedShape>,
    inputs: &ArrayView2<'_, f64>,
) -> Result<FittedShape, ForecastError> {
    let shape = fitted.ok_or_else(|| ForecastError::NotTrained {
        model: model.to_string(),
    })?;
    if inputs.ncols() != shape.window_size {
        return Err(ForecastError::ShapeMismatch {
            context: "prediction input",
            expected: shape.window_size,
            actual: inputs.ncols(),
        });
    }
    Ok(shape)
}

/// Reject training data whose windows disagree with the training set.
pub(crate) fn check_validation(
    train: &Dataset,
    validation: Option<&Dataset>,
) -> Result<(), ForecastError> {
    if train.is_empty() {
        return Err(ForecastError::EmptyInput { operation: "train on" });
    }
    if let Some(validation) = validation {
        if validation.window_size() != train.window_size() {
            return Err(ForecastError::ShapeMismatch {
                context: "validation window",
                expected: train.window_size(),
                actual: validation.window_size(),
            });
        }
        if validation.prediction_steps() != train.prediction_steps() {
            return Err(ForecastError::ShapeMismatch {
                context: "validation horizon",
                expected: train.prediction_steps(),
                actual: validation.prediction_steps(),
            });
        }
    }
    Ok(())
}

pub(crate) fn mean_squared(predicted: &Array2<f64>, expected: &Array2<f64>) -> f64 {
    let count = expected.len();
    if count == 0 {
        return 0.0;
    }
    let total: f64 = predicted
        .iter()
        .zip(expected.iter())
        .map(|(p, e)| (p - e).powi(2))
        .sum();
    total / count as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Linear,
    Trend,
}

impl ModelKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Trend => "trend",
        }
    }
}

impl Display for ModelKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "trend" => Ok(Self::Trend),
            other => Err(ForecastError::configuration(format!(
                "unknown model '{other}' (expected linear or trend)"
            ))),
        }
    }
}

/// Model selection plus training hyper-parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub kind: ModelKind,
    pub epochs: usize,
    pub batch_size: usize,
    pub patience: usize,
    pub learning_rate: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: ModelKind::Linear,
            epochs: 100,
            batch_size: 16,
            patience: 50,
            learning_rate: 0.5,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.epochs == 0 {
            return Err(ForecastError::configuration("epochs must be positive"));
        }
        if self.batch_size == 0 {
            return Err(ForecastError::configuration("batch_size must be positive"));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ForecastError::configuration(format!(
                "learning_rate must be a positive finite number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }

    /// Instantiate the configured model; `seed` drives any randomness.
    pub fn build(&self, seed: u64) -> Result<Box<dyn Predictor>, ForecastError> {
        self.validate()?;
        Ok(match self.kind {
            ModelKind::Linear => Box::new(LinearRegressor::new(LinearConfig {
                epochs: self.epochs,
                batch_size: self.batch_size,
                patience: self.patience,
                learning_rate: self.learning_rate,
                seed,
            })),
            ModelKind::Trend => Box::new(TrendModel::default()),
        })
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::window::{WindowConfig, WindowGenerator};

    #[test]
    fn model_kind_parses_case_insensitively() {
        assert_eq!("Linear".parse::<ModelKind>().expect("known"), ModelKind::Linear);
        assert_eq!(" trend ".parse::<ModelKind>().expect("known"), ModelKind::Trend);
        assert!("lstm".parse::<ModelKind>().is_err());
    }

    #[test]
    fn rejects_zero_batch_size() {
        let config = ModelConfig {
            batch_size: 0,
            ..ModelConfig::default()
        };
        assert!(matches!(
            config.build(42).err(),
            Some(ForecastError::Configuration(_))
        ));
    }

    #[test]
    fn builds_every_kind_untrained() {
        for kind in [ModelKind::Linear, ModelKind::Trend] {
            let model = ModelConfig {
                kind,
                ..ModelConfig::default()
            }
            .build(7)
            .expect("valid config");
            assert_eq!(model.name(), kind.as_str());
            assert!(!model.is_trained());
            let err = model
                .predict(Array2::<f64>::zeros((1, 4)).view())
                .expect_err("untrained");
            assert!(matches!(err, ForecastError::NotTrained { .. }));
        }
    }

    #[test]
    fn validation_shape_must_match_training() {
        let train = WindowGenerator::new(WindowConfig::new(4, 2, 1))
            .and_then(|g| g.generate(&[0.1; 12]))
            .expect("valid");
        let other = WindowGenerator::new(WindowConfig::new(3, 1, 1))
            .and_then(|g| g.generate(&[0.1; 12]))
            .expect("valid");

        let err = check_validation(&train, Some(&other)).expect_err("mismatch");
        assert!(matches!(err, ForecastError::ShapeMismatch { .. }));
        assert!(check_validation(&train, None).is_ok());
    }
}
