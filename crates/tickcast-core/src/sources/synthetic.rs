//! Deterministic synthetic price series.
//!
//! Prices follow a seeded geometric random walk over a business-day
//! calendar:
//!
//! ```text
//! price[0] = base
//! price[i] = max(price[i-1] * (1 + volatility[i] + trend[i] + jitter[i]), floor_ratio * base)
//! ```
//!
//! `volatility` and `jitter` are zero-mean Gaussian draws, `trend` is a linear
//! ramp from `trend_start` to `trend_end` across the series. The RNG seed is
//! derived from the configured seed and the symbol, so one
//! (seed, symbol, range, granularity) tuple always yields the same series.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use time::{Date, Time, Weekday};
use tracing::info;

use crate::data_source::{SeriesSource, SourceError, SourceId};
use crate::{Interval, PricePoint, SeriesRequest, Symbol, TimeSeries, UtcDateTime};

/// Market session bounds for minute granularity (inclusive).
const SESSION_OPEN: (u8, u8) = (9, 15);
const SESSION_CLOSE: (u8, u8) = (15, 30);

/// Parameters of the synthetic random walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub seed: u64,
    /// Sampling granularity; `None` follows the request interval.
    pub granularity: Option<Interval>,
    pub volatility: f64,
    pub jitter: f64,
    pub trend_start: f64,
    pub trend_end: f64,
    pub floor_ratio: f64,
    pub default_base_price: f64,
    pub base_prices: BTreeMap<String, f64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            granularity: Some(Interval::Minute),
            volatility: 0.002,
            jitter: 0.001,
            trend_start: -0.001,
            trend_end: 0.001,
            floor_ratio: 0.8,
            default_base_price: 1000.0,
            base_prices: BTreeMap::from([
                (String::from("INFY.NS"), 1200.0),
                (String::from("TCS.NS"), 2300.0),
                (String::from("CIPLA.NS"), 450.0),
            ]),
        }
    }
}

impl SyntheticConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_granularity(mut self, granularity: Option<Interval>) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn base_price(&self, symbol: &Symbol) -> f64 {
        self.base_prices
            .get(symbol.as_str())
            .copied()
            .unwrap_or(self.default_base_price)
    }

    pub fn validate(&self) -> Result<(), SourceError> {
        let finite = [
            self.volatility,
            self.jitter,
            self.trend_start,
            self.trend_end,
            self.floor_ratio,
            self.default_base_price,
        ]
        .iter()
        .all(|value| value.is_finite());
        if !finite {
            return Err(SourceError::invalid_request(
                "synthetic parameters must be finite",
            ));
        }
        if self.volatility < 0.0 || self.jitter < 0.0 {
            return Err(SourceError::invalid_request(
                "synthetic volatility and jitter must be non-negative",
            ));
        }
        if self.default_base_price <= 0.0 || self.base_prices.values().any(|price| *price <= 0.0) {
            return Err(SourceError::invalid_request(
                "synthetic base prices must be positive",
            ));
        }
        Ok(())
    }
}

/// Seeded generator standing in for an unavailable upstream.
#[derive(Debug, Clone, Default)]
pub struct SyntheticSource {
    config: SyntheticConfig,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    /// Build the series for `req`. Empty when the range holds no business day.
    pub fn generate(&self, req: &SeriesRequest) -> Result<TimeSeries, SourceError> {
        self.config.validate()?;

        let granularity = self.config.granularity.unwrap_or(req.interval);
        let timestamps = trading_timestamps(req.start, req.end, granularity);
        let n_points = timestamps.len();
        let base_price = self.config.base_price(&req.symbol);

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed ^ symbol_seed(&req.symbol));
        let volatility = gaussian(self.config.volatility)?;
        let jitter = gaussian(self.config.jitter)?;
        let price_changes: Vec<f64> = (0..n_points).map(|_| volatility.sample(&mut rng)).collect();
        let noise: Vec<f64> = (0..n_points).map(|_| jitter.sample(&mut rng)).collect();
        let trend = linspace(self.config.trend_start, self.config.trend_end, n_points);

        let floor = base_price * self.config.floor_ratio;
        let mut points = Vec::with_capacity(n_points);
        let mut price = base_price;
        for (index, ts) in timestamps.into_iter().enumerate() {
            if index > 0 {
                let change = price_changes[index] + trend[index] + noise[index];
                price = (price * (1.0 + change)).max(floor);
            }
            let point = PricePoint::new(ts, price).map_err(|e| {
                SourceError::internal(format!("synthetic walk diverged at step {index}: {e}"))
            })?;
            points.push(point);
        }

        let series = TimeSeries::new(req.symbol.clone(), granularity, points)
            .map_err(|e| SourceError::internal(e.to_string()))?;
        Ok(series.into_synthetic())
    }
}

impl SeriesSource for SyntheticSource {
    fn id(&self) -> SourceId {
        SourceId::Synthetic
    }

    fn fetch(&self, req: &SeriesRequest) -> Result<TimeSeries, SourceError> {
        let series = self.generate(req)?;
        if series.is_empty() {
            return Err(SourceError::unavailable(format!(
                "no business days in {}",
                req.range_label()
            )));
        }
        info!(
            symbol = %req.symbol,
            range = %req.range_label(),
            granularity = %series.interval(),
            points = series.len(),
            seed = self.config.seed,
            "generated synthetic series"
        );
        Ok(series)
    }
}

/// Every trading timestamp between `start` and `end` inclusive, Monday to Friday.
pub fn trading_timestamps(start: Date, end: Date, granularity: Interval) -> Vec<UtcDateTime> {
    let mut timestamps = Vec::new();
    let mut day = start;
    while day <= end {
        if !matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday) {
            match granularity {
                Interval::Daily => timestamps.push(UtcDateTime::at(day, Time::MIDNIGHT)),
                Interval::Minute => timestamps.extend(session_minutes(day)),
            }
        }
        match day.next_day() {
            Some(next) => day = next,
            None => break,
        }
    }
    timestamps
}

fn session_minutes(day: Date) -> impl Iterator<Item = UtcDateTime> {
    let open = u16::from(SESSION_OPEN.0) * 60 + u16::from(SESSION_OPEN.1);
    let close = u16::from(SESSION_CLOSE.0) * 60 + u16::from(SESSION_CLOSE.1);
    (open..=close).filter_map(move |minute| {
        let time = Time::from_hms((minute / 60) as u8, (minute % 60) as u8, 0).ok()?;
        Some(UtcDateTime::at(day, time))
    })
}

fn gaussian(std_dev: f64) -> Result<Normal<f64>, SourceError> {
    Normal::new(0.0, std_dev)
        .map_err(|e| SourceError::invalid_request(format!("invalid gaussian parameters: {e}")))
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}

#[cfg(test)]
mod tests {
    use time::Month;

    use super::*;

    fn date(month: Month, day: u8) -> Date {
        Date::from_calendar_date(2014, month, day).expect("valid date")
    }

    fn request(symbol: &str, interval: Interval) -> SeriesRequest {
        SeriesRequest::new(
            Symbol::parse(symbol).expect("valid"),
            date(Month::October, 16),
            date(Month::November, 28),
            interval,
        )
        .expect("valid request")
    }

    #[test]
    fn calendar_skips_weekends() {
        // 2014-07-04 is a Friday, 07-07 a Monday.
        let days = trading_timestamps(date(Month::July, 4), date(Month::July, 7), Interval::Daily);
        let rendered: Vec<String> = days.iter().map(|ts| ts.format_rfc3339()).collect();
        assert_eq!(rendered, vec!["2014-07-04T00:00:00Z", "2014-07-07T00:00:00Z"]);
    }

    #[test]
    fn minute_calendar_covers_the_session() {
        let minutes =
            trading_timestamps(date(Month::July, 4), date(Month::July, 4), Interval::Minute);
        assert_eq!(minutes.len(), 376);
        assert_eq!(minutes[0].format_rfc3339(), "2014-07-04T09:15:00Z");
        assert_eq!(minutes[375].format_rfc3339(), "2014-07-04T15:30:00Z");
    }

    #[test]
    fn same_inputs_produce_bit_identical_series() {
        let source = SyntheticSource::default();
        let first = source.generate(&request("TCS.NS", Interval::Daily)).expect("generated");
        let second = source.generate(&request("TCS.NS", Interval::Daily)).expect("generated");

        let first_bits: Vec<u64> = first.values().iter().map(|v| v.to_bits()).collect();
        let second_bits: Vec<u64> = second.values().iter().map(|v| v.to_bits()).collect();
        assert_eq!(first_bits, second_bits);
        assert!(first.is_synthetic());
    }

    #[test]
    fn different_seeds_diverge() {
        let req = request("INFY.NS", Interval::Daily);
        let config = SyntheticConfig::default().with_granularity(None);
        let a = SyntheticSource::new(config.clone().with_seed(1)).generate(&req).expect("ok");
        let b = SyntheticSource::new(config.with_seed(2)).generate(&req).expect("ok");
        assert_ne!(a.values(), b.values());
    }

    #[test]
    fn walk_starts_at_base_and_respects_floor() {
        let config = SyntheticConfig {
            trend_start: -0.05,
            trend_end: -0.05,
            ..SyntheticConfig::default()
        };
        let series = SyntheticSource::new(config)
            .generate(&request("CIPLA.NS", Interval::Minute))
            .expect("generated");

        let values = series.values();
        assert_eq!(values[0], 450.0);
        assert!(values.iter().all(|v| *v >= 450.0 * 0.8));
        assert_eq!(*values.last().expect("non-empty"), 450.0 * 0.8);
    }

    #[test]
    fn granularity_override_follows_request_when_unset() {
        let source = SyntheticSource::new(SyntheticConfig::default().with_granularity(None));
        let series = source.generate(&request("TCS.NS", Interval::Daily)).expect("ok");
        assert_eq!(series.interval(), Interval::Daily);
        // 2014-10-16..=2014-11-28 holds 32 business days.
        assert_eq!(series.len(), 32);
        assert_eq!(series.values()[0], 2300.0);
    }

    #[test]
    fn weekend_only_range_is_unavailable() {
        let req = SeriesRequest::new(
            Symbol::parse("INFY.NS").expect("valid"),
            date(Month::July, 5),
            date(Month::July, 6),
            Interval::Daily,
        )
        .expect("valid");
        assert!(SyntheticSource::default().fetch(&req).is_err());
    }

    #[test]
    fn rejects_negative_volatility() {
        let config = SyntheticConfig {
            volatility: -1.0,
            ..SyntheticConfig::default()
        };
        assert!(SyntheticSource::new(config)
            .generate(&request("TCS.NS", Interval::Daily))
            .is_err());
    }
}
