//! Run configuration.
//!
//! Defaults reproduce the reference experiment: train on Infosys daily closes
//! for 2014-07-01..2014-10-14, evaluate Infosys, TCS and Cipla over
//! 2014-10-16..2014-11-28.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tickcast_core::{Interval, SeriesRequest, Symbol, SyntheticConfig, DEFAULT_TIMEOUT_MS};
use time::macros::date;
use time::Date;

use crate::predictor::ModelConfig;
use crate::window::{validate_split_ratio, WindowConfig};
use crate::ForecastError;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// One labelled series to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub label: String,
    pub symbol: String,
    #[serde(with = "iso_date")]
    pub start: Date,
    #[serde(with = "iso_date")]
    pub end: Date,
}

impl TargetSpec {
    pub fn new(
        label: impl Into<String>,
        symbol: impl Into<String>,
        start: Date,
        end: Date,
    ) -> Self {
        Self {
            label: label.into(),
            symbol: symbol.into(),
            start,
            end,
        }
    }

    pub fn request(&self, interval: Interval) -> Result<SeriesRequest, ForecastError> {
        let symbol = Symbol::parse(&self.symbol)?;
        Ok(SeriesRequest::new(symbol, self.start, self.end, interval)?)
    }
}

/// Upstream access and synthetic fallback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Skip the network and always synthesise.
    pub offline: bool,
    pub timeout_ms: u64,
    pub synthetic: SyntheticConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            offline: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            synthetic: SyntheticConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub interval: Interval,
    pub training: TargetSpec,
    pub evaluation: Vec<TargetSpec>,
    pub window: WindowConfig,
    /// Share of training windows used for fitting; the rest validates.
    pub split_ratio: f64,
    /// Drives the synthetic fallback and any stochastic model.
    pub seed: u64,
    /// Inverse-transform forecasts before scoring.
    pub metrics_in_price_units: bool,
    pub model: ModelConfig,
    pub source: SourceConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let eval_start = date!(2014 - 10 - 16);
        let eval_end = date!(2014 - 11 - 28);
        Self {
            interval: Interval::Daily,
            training: TargetSpec::new(
                "INFY",
                "INFY.NS",
                date!(2014 - 07 - 01),
                date!(2014 - 10 - 14),
            ),
            evaluation: vec![
                TargetSpec::new("INFY", "INFY.NS", eval_start, eval_end),
                TargetSpec::new("TCS", "TCS.NS", eval_start, eval_end),
                TargetSpec::new("CIPLA", "CIPLA.NS", eval_start, eval_end),
            ],
            window: WindowConfig::default(),
            split_ratio: 0.8,
            seed: 42,
            metrics_in_price_units: false,
            model: ModelConfig::default(),
            source: SourceConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ForecastError> {
        serde_json::from_str(raw)
            .map_err(|e| ForecastError::configuration(format!("invalid config JSON: {e}")))
    }

    /// Read a JSON file; missing fields take their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ForecastError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ForecastError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Synthetic settings with the run seed applied.
    pub fn synthetic_config(&self) -> SyntheticConfig {
        self.source.synthetic.clone().with_seed(self.seed)
    }

    /// Check everything that can be checked without fetching.
    pub fn validate(&self) -> Result<(), ForecastError> {
        self.window.stride()?;
        validate_split_ratio(self.split_ratio)?;
        self.model.validate()?;
        self.synthetic_config()
            .validate()
            .map_err(|e| ForecastError::configuration(e.message()))?;
        if self.source.timeout_ms == 0 {
            return Err(ForecastError::configuration("timeout_ms must be positive"));
        }

        self.training.request(self.interval)?;
        if self.evaluation.is_empty() {
            return Err(ForecastError::configuration("no evaluation targets"));
        }
        let mut labels = HashSet::new();
        for target in &self.evaluation {
            if target.label.trim().is_empty() {
                return Err(ForecastError::configuration("evaluation label is empty"));
            }
            if !labels.insert(target.label.as_str()) {
                return Err(ForecastError::configuration(format!(
                    "duplicate evaluation label '{}'",
                    target.label
                )));
            }
            target.request(self.interval)?;
        }
        Ok(())
    }
}
