use thiserror::Error;
use tickcast_ml::ForecastError;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickcast_core::ValidationError),

    #[error("invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_)
            | Self::Argument(_)
            | Self::Forecast(ForecastError::Configuration(_) | ForecastError::Validation(_)) => 2,
            Self::Forecast(_) => 3,
            Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}
