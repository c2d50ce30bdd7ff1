//! Sliding-window dataset construction.
//!
//! For a series `s`, window size `W`, overlap `O` and horizon `P`, the
//! generator emits one pair per start index `i = 0, S, 2S, ...` with
//! stride `S = W - O`:
//!
//! ```text
//! input  = s[i .. i + W]
//! target = s[i + W .. i + W + P]
//! ```
//!
//! and stops before the first `i` where `i + W + P > len(s)`. Windows never
//! wrap or pad; a trailing partial window is dropped. The number of pairs is
//! `floor((L - W - P) / S) + 1` when `L >= W + P`, otherwise zero.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ForecastError;

/// Window geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub window_size: usize,
    pub overlap: usize,
    pub prediction_steps: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_size: 100,
            overlap: 90,
            prediction_steps: 10,
        }
    }
}

impl WindowConfig {
    pub const fn new(window_size: usize, overlap: usize, prediction_steps: usize) -> Self {
        Self {
            window_size,
            overlap,
            prediction_steps,
        }
    }

    /// Distance between consecutive window starts.
    ///
    /// # Errors
    ///
    /// [`ForecastError::Configuration`] unless `0 <= overlap < window_size`
    /// and `prediction_steps > 0`.
    pub fn stride(&self) -> Result<usize, ForecastError> {
        if self.window_size == 0 {
            return Err(ForecastError::configuration("window_size must be positive"));
        }
        if self.prediction_steps == 0 {
            return Err(ForecastError::configuration(
                "prediction_steps must be positive",
            ));
        }
        if self.overlap >= self.window_size {
            return Err(ForecastError::configuration(format!(
                "overlap {} must be smaller than window_size {} (stride must be positive)",
                self.overlap, self.window_size
            )));
        }
        Ok(self.window_size - self.overlap)
    }

    /// Shortest series that yields one pair.
    pub const fn min_series_len(&self) -> usize {
        self.window_size + self.prediction_steps
    }

    /// Number of pairs a series of `len` points yields.
    pub fn expected_windows(&self, len: usize) -> Result<usize, ForecastError> {
        let stride = self.stride()?;
        Ok(match len.checked_sub(self.min_series_len()) {
            Some(slack) => slack / stride + 1,
            None => 0,
        })
    }
}

/// One (input window, target) pair and where it starts in the source series.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub start: usize,
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

/// Temporally ordered pairs from one sweep over one series.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    window_size: usize,
    prediction_steps: usize,
    samples: Vec<Sample>,
}

impl Dataset {
    pub fn empty(window_size: usize, prediction_steps: usize) -> Self {
        Self {
            window_size,
            prediction_steps,
            samples: Vec::new(),
        }
    }

    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    pub const fn prediction_steps(&self) -> usize {
        self.prediction_steps
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn starts(&self) -> Vec<usize> {
        self.samples.iter().map(|sample| sample.start).collect()
    }

    /// Input matrix, `len x window_size`.
    pub fn inputs(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.len(), self.window_size), |(row, col)| {
            self.samples[row].input[col]
        })
    }

    /// Target matrix, `len x prediction_steps`.
    pub fn targets(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.len(), self.prediction_steps), |(row, col)| {
            self.samples[row].target[col]
        })
    }

    /// Split at `floor(ratio * len)` without reordering: every training
    /// window starts before every validation window.
    ///
    /// # Errors
    ///
    /// [`ForecastError::Configuration`] unless `0 < ratio <= 1`.
    pub fn split_chronological(&self, ratio: f64) -> Result<(Dataset, Dataset), ForecastError> {
        validate_split_ratio(ratio)?;
        let split_idx = ((ratio * self.len() as f64).floor() as usize).min(self.len());
        let (train, validation) = self.samples.split_at(split_idx);
        Ok((
            self.with_samples(train.to_vec()),
            self.with_samples(validation.to_vec()),
        ))
    }

    fn with_samples(&self, samples: Vec<Sample>) -> Dataset {
        Dataset {
            window_size: self.window_size,
            prediction_steps: self.prediction_steps,
            samples,
        }
    }
}

pub(crate) fn validate_split_ratio(ratio: f64) -> Result<(), ForecastError> {
    if !(ratio > 0.0 && ratio <= 1.0) {
        return Err(ForecastError::configuration(format!(
            "split ratio must be in (0, 1], got {ratio}"
        )));
    }
    Ok(())
}

/// Deterministic producer of [`Dataset`]s for a fixed [`WindowConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGenerator {
    config: WindowConfig,
    stride: usize,
}

impl WindowGenerator {
    pub fn new(config: WindowConfig) -> Result<Self, ForecastError> {
        let stride = config.stride()?;
        Ok(Self { config, stride })
    }

    pub const fn config(&self) -> WindowConfig {
        self.config
    }

    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Sweep `series` from index 0.
    ///
    /// # Errors
    ///
    /// [`ForecastError::InsufficientData`] when the series is shorter than
    /// `window_size + prediction_steps`.
    pub fn generate(&self, series: &[f64]) -> Result<Dataset, ForecastError> {
        let WindowConfig {
            window_size,
            prediction_steps,
            ..
        } = self.config;
        let needed = self.config.min_series_len();
        if series.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                available: series.len(),
            });
        }

        let samples: Vec<Sample> = (0..=series.len() - needed)
            .step_by(self.stride)
            .map(|start| {
                let split = start + window_size;
                Sample {
                    start,
                    input: series[start..split].to_vec(),
                    target: series[split..split + prediction_steps].to_vec(),
                }
            })
            .collect();

        debug!(
            windows = samples.len(),
            window_size,
            stride = self.stride,
            prediction_steps,
            "generated sliding windows"
        );

        Ok(Dataset {
            window_size,
            prediction_steps,
            samples,
        })
    }
}
