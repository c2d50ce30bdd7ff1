use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::timestamp::format_date;
use crate::{Interval, Symbol, UtcDateTime, ValidationError};

/// One observation of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub ts: UtcDateTime,
    pub value: f64,
}

impl PricePoint {
    pub fn new(ts: UtcDateTime, value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "value" });
        }
        Ok(Self { ts, value })
    }
}

/// Time-ordered closing prices for one symbol.
///
/// Timestamps are strictly increasing and every value is finite. The series
/// is immutable once built; consumers read it through [`TimeSeries::values`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    symbol: Symbol,
    interval: Interval,
    points: Vec<PricePoint>,
    synthetic: bool,
}

impl TimeSeries {
    pub fn new(
        symbol: Symbol,
        interval: Interval,
        points: Vec<PricePoint>,
    ) -> Result<Self, ValidationError> {
        for (index, pair) in points.windows(2).enumerate() {
            if pair[1].ts <= pair[0].ts {
                return Err(ValidationError::NonIncreasingTimestamp { index: index + 1 });
            }
        }
        if points.iter().any(|point| !point.value.is_finite()) {
            return Err(ValidationError::NonFiniteValue { field: "value" });
        }

        Ok(Self {
            symbol,
            interval,
            points,
            synthetic: false,
        })
    }

    pub fn empty(symbol: Symbol, interval: Interval) -> Self {
        Self {
            symbol,
            interval,
            points: Vec::new(),
            synthetic: false,
        }
    }

    /// Mark the series as produced by the synthetic generator.
    pub fn into_synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub const fn interval(&self) -> Interval {
        self.interval
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub const fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// Request for a historical series over an inclusive calendar range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRequest {
    pub symbol: Symbol,
    pub start: Date,
    pub end: Date,
    pub interval: Interval,
}

impl SeriesRequest {
    pub fn new(
        symbol: Symbol,
        start: Date,
        end: Date,
        interval: Interval,
    ) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidDateRange {
                start: format_date(start),
                end: format_date(end),
            });
        }

        Ok(Self {
            symbol,
            start,
            end,
            interval,
        })
    }

    /// `start..end` rendered for log lines.
    pub fn range_label(&self) -> String {
        format!("{}..{}", format_date(self.start), format_date(self.end))
    }
}
