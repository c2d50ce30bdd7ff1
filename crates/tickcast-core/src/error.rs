use thiserror::Error;

/// Rejected input to a core domain type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid symbol '{value}': {reason}")]
    InvalidSymbol { value: String, reason: &'static str },
    #[error("symbol contains '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("unknown interval '{value}' (use 1m or 1d)")]
    InvalidInterval { value: String },

    #[error("not an RFC3339 timestamp: '{value}'")]
    InvalidTimestamp { value: String },
    #[error("expected a YYYY-MM-DD date, got '{value}'")]
    InvalidDate { value: String },
    #[error("range starts {start}, after its end {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("{field} must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("price points out of order at index {index}")]
    NonIncreasingTimestamp { index: usize },
}
