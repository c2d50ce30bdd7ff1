//! Series source trait and source error types.
//!
//! [`SeriesSource`] is the contract every historical-price provider follows.
//! A source either returns a validated [`TimeSeries`] or a structured
//! [`SourceError`]; [`SeriesSource::fetch_or_empty`] adapts that into the
//! "never raise, return empty" boundary the forecasting pipeline consumes.
//!
//! | Source | Behaviour |
//! |--------|-----------|
//! | [`YahooSource`](crate::sources::YahooSource) | Yahoo Finance chart API over HTTP |
//! | [`SyntheticSource`](crate::sources::SyntheticSource) | Seeded geometric random walk |
//! | [`FallbackSource`](crate::sources::FallbackSource) | Primary source, synthetic on empty |

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{SeriesRequest, TimeSeries};

/// Canonical source identifiers used in logs and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Yahoo,
    Synthetic,
    Fallback,
}

impl SourceId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::Synthetic => "synthetic",
            Self::Fallback => "fallback",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Upstream unreachable, timed out, or returned no rows.
    Unavailable,
    InvalidRequest,
    Internal,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Historical price-series provider.
///
/// Calls are blocking and must return within the source's configured
/// timeout. Implementations never return a series that violates the
/// [`TimeSeries`] invariants.
pub trait SeriesSource {
    fn id(&self) -> SourceId;

    /// Fetch closing prices for `req`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceErrorKind::Unavailable`] when the upstream cannot be
    /// reached, times out, or has no rows for the range.
    fn fetch(&self, req: &SeriesRequest) -> Result<TimeSeries, SourceError>;

    /// Fetch, logging and swallowing any failure into an empty series.
    fn fetch_or_empty(&self, req: &SeriesRequest) -> TimeSeries {
        match self.fetch(req) {
            Ok(series) => series,
            Err(error) => {
                warn!(
                    source = %self.id(),
                    symbol = %req.symbol,
                    range = %req.range_label(),
                    reason = %error,
                    "series fetch failed, returning empty series"
                );
                TimeSeries::empty(req.symbol.clone(), req.interval)
            }
        }
    }
}

impl<S: SeriesSource + ?Sized> SeriesSource for &S {
    fn id(&self) -> SourceId {
        (**self).id()
    }

    fn fetch(&self, req: &SeriesRequest) -> Result<TimeSeries, SourceError> {
        (**self).fetch(req)
    }
}

impl<S: SeriesSource + ?Sized> SeriesSource for Box<S> {
    fn id(&self) -> SourceId {
        (**self).id()
    }

    fn fetch(&self, req: &SeriesRequest) -> Result<TimeSeries, SourceError> {
        (**self).fetch(req)
    }
}
