use thiserror::Error;
use tickcast_core::{SourceError, ValidationError};

/// Errors raised while windowing, training, predicting, or evaluating.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastError {
    #[error("cannot {operation} an empty input")]
    EmptyInput { operation: &'static str },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("insufficient data: need at least {needed} points, got {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("{context} shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("model '{model}' must be trained before predicting")]
    NotTrained { model: String },

    #[error("chronological split left no training windows ({total} windows at ratio {ratio})")]
    NoTrainingWindows { total: usize, ratio: f64 },

    #[error("training diverged at epoch {epoch}: loss is not finite")]
    TrainingDiverged { epoch: usize },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl ForecastError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether the pipeline may skip the affected series and continue.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. }
                | Self::ShapeMismatch { .. }
                | Self::EmptyInput { .. }
                | Self::Source(_)
        )
    }
}
