//! Min/max scaling into `[0, 1]`.
//!
//! The fitted [`ScaleParams`] travel with the normalized values so forecasts
//! can be mapped back to price units: `value = normalized * (max - min) + min`.

use ndarray::{Array, Dimension};
use serde::{Deserialize, Serialize};
use tickcast_core::TimeSeries;

use crate::ForecastError;

/// Fitted min/max of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleParams {
    pub min: f64,
    pub max: f64,
}

impl ScaleParams {
    pub fn fit(values: &[f64]) -> Result<Self, ForecastError> {
        let Some(&first) = values.first() else {
            return Err(ForecastError::EmptyInput {
                operation: "normalize",
            });
        };

        let (min, max) = values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Ok(Self { min, max })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Constant input; every value normalizes to zero.
    pub fn is_constant(&self) -> bool {
        self.max == self.min
    }

    pub fn transform(&self, value: f64) -> f64 {
        if self.is_constant() {
            0.0
        } else {
            (value - self.min) / self.range()
        }
    }

    pub fn inverse(&self, normalized: f64) -> f64 {
        normalized * self.range() + self.min
    }

    pub fn inverse_transform(&self, normalized: &[f64]) -> Vec<f64> {
        normalized.iter().map(|&v| self.inverse(v)).collect()
    }

    pub fn inverse_array<D: Dimension>(&self, normalized: &Array<f64, D>) -> Array<f64, D> {
        normalized.mapv(|v| self.inverse(v))
    }
}

/// Normalized values alongside the originals and the fit that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    pub values: Vec<f64>,
    pub original: Vec<f64>,
    pub params: ScaleParams,
}

impl NormalizedSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Fit min/max on `values` and rescale them into `[0, 1]`.
///
/// # Errors
///
/// [`ForecastError::EmptyInput`] when `values` is empty.
pub fn fit_transform(values: &[f64]) -> Result<NormalizedSeries, ForecastError> {
    let params = ScaleParams::fit(values)?;
    Ok(NormalizedSeries {
        values: values.iter().map(|&v| params.transform(v)).collect(),
        original: values.to_vec(),
        params,
    })
}

pub fn fit_transform_series(series: &TimeSeries) -> Result<NormalizedSeries, ForecastError> {
    fit_transform(&series.values())
}
