use ndarray::{Array2, ArrayView2};
use tracing::debug;

use super::{
    check_inputs, check_validation, mean_squared, FittedShape, Monitor, Predictor,
    TrainingSummary,
};
use crate::window::Dataset;
use crate::ForecastError;

const DEFAULT_TREND: f64 = 0.01;

/// Compounding baseline.
///
/// Learns the mean relative step from the last input value to the first
/// target value, then projects `last * (1 + trend)^k` for `k = 1..=steps`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendModel {
    fitted: Option<(FittedShape, f64)>,
}

impl TrendModel {
    pub fn trend(&self) -> Option<f64> {
        self.fitted.map(|(_, trend)| trend)
    }

    fn project(inputs: &ArrayView2<'_, f64>, steps: usize, trend: f64) -> Array2<f64> {
        let last_col = inputs.ncols().saturating_sub(1);
        Array2::from_shape_fn((inputs.nrows(), steps), |(row, step)| {
            inputs[[row, last_col]] * (1.0 + trend).powi(step as i32 + 1)
        })
    }
}

impl Predictor for TrendModel {
    fn name(&self) -> &str {
        "trend"
    }

    fn train(
        &mut self,
        train: &Dataset,
        validation: Option<&Dataset>,
    ) -> Result<TrainingSummary, ForecastError> {
        check_validation(train, validation)?;
        let shape = FittedShape::of(train);

        let ratios: Vec<f64> = train
            .samples()
            .iter()
            .filter_map(|sample| {
                let last = *sample.input.last()?;
                let next = *sample.target.first()?;
                Some((next - last) / last)
            })
            .filter(|ratio| ratio.is_finite())
            .collect();
        let trend = if ratios.is_empty() {
            DEFAULT_TREND
        } else {
            ratios.iter().sum::<f64>() / ratios.len() as f64
        };
        debug!(trend, usable = ratios.len(), "fitted trend baseline");
        self.fitted = Some((shape, trend));

        let (monitored, scored) = match validation.filter(|dataset| !dataset.is_empty()) {
            Some(dataset) => (Monitor::ValidationLoss, dataset),
            None => (Monitor::TrainingLoss, train),
        };
        let forecast = Self::project(&scored.inputs().view(), shape.prediction_steps, trend);
        let best_loss = mean_squared(&forecast, &scored.targets());

        Ok(TrainingSummary {
            model: self.name().to_string(),
            train_windows: train.len(),
            validation_windows: validation.map_or(0, Dataset::len),
            epochs_run: 1,
            best_epoch: 1,
            best_loss,
            monitored,
        })
    }

    fn predict(&self, inputs: ArrayView2<'_, f64>) -> Result<Array2<f64>, ForecastError> {
        let shape = check_inputs(self.name(), self.fitted.map(|(shape, _)| shape), &inputs)?;
        let trend = self.trend().unwrap_or(DEFAULT_TREND);
        Ok(Self::project(&inputs, shape.prediction_steps, trend))
    }

    fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::window::{WindowConfig, WindowGenerator};

    #[test]
    fn learns_geometric_growth() {
        let series: Vec<f64> = (0..20).map(|i| 100.0 * 1.02_f64.powi(i)).collect();
        let data = WindowGenerator::new(WindowConfig::new(4, 2, 2))
            .and_then(|generator| generator.generate(&series))
            .expect("valid");
        let mut model = TrendModel::default();

        let summary = model.train(&data, None).expect("trains");

        let trend = model.trend().expect("trained");
        assert!((trend - 0.02).abs() < 1e-12);
        assert!(summary.best_loss < 1e-12);
        let forecast = model.predict(array![[1.0, 2.0, 4.0, 10.0]].view()).expect("trained");
        assert!((forecast[[0, 0]] - 10.2).abs() < 1e-9);
        assert!((forecast[[0, 1]] - 10.404).abs() < 1e-9);
    }

    #[test]
    fn zero_anchors_fall_back_to_default_trend() {
        let data = WindowGenerator::new(WindowConfig::new(2, 1, 1))
            .and_then(|generator| generator.generate(&[0.0, 0.0, 0.0, 0.0]))
            .expect("valid");
        let mut model = TrendModel::default();

        model.train(&data, None).expect("trains");

        assert_eq!(model.trend(), Some(DEFAULT_TREND));
    }
}
