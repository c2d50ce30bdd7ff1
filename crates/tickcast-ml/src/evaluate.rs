//! Forecast accuracy metrics and the per-run results store.

use ndarray::{ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ForecastError;

/// Accuracy of one forecast set against ground truth.
///
/// `mape` is in percent and skips entries whose true value is zero; the
/// number skipped is `mape_excluded`. It is `None` when every true value is
/// zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub label: String,
    /// Flattened element count.
    pub samples: usize,
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub mape: Option<f64>,
    pub mape_excluded: usize,
    pub r2: f64,
}

/// Compare `y_true` and `y_pred` element-wise after flattening.
///
/// # Errors
///
/// - [`ForecastError::ShapeMismatch`] when element counts differ
/// - [`ForecastError::EmptyInput`] when there is nothing to compare
pub fn compute_metrics<S1, S2, D1, D2>(
    label: &str,
    y_true: &ArrayBase<S1, D1>,
    y_pred: &ArrayBase<S2, D2>,
) -> Result<Metrics, ForecastError>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D1: Dimension,
    D2: Dimension,
{
    if y_true.len() != y_pred.len() {
        return Err(ForecastError::ShapeMismatch {
            context: "evaluation",
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    let truth: Vec<f64> = y_true.iter().copied().collect();
    let predicted: Vec<f64> = y_pred.iter().copied().collect();
    metrics_from_slices(label, &truth, &predicted)
}

fn metrics_from_slices(
    label: &str,
    truth: &[f64],
    predicted: &[f64],
) -> Result<Metrics, ForecastError> {
    if truth.is_empty() {
        return Err(ForecastError::EmptyInput {
            operation: "evaluate",
        });
    }
    let n = truth.len() as f64;

    let ss_res: f64 = truth
        .iter()
        .zip(predicted)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let mse = ss_res / n;
    let mae = truth
        .iter()
        .zip(predicted)
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / n;

    let (mape_sum, mape_count) = truth
        .iter()
        .zip(predicted)
        .filter(|(t, _)| **t != 0.0)
        .fold((0.0, 0_usize), |(sum, count), (t, p)| {
            (sum + ((t - p) / t).abs(), count + 1)
        });
    let mape = (mape_count > 0).then(|| mape_sum / mape_count as f64 * 100.0);

    let mean = truth.iter().sum::<f64>() / n;
    let ss_tot: f64 = truth.iter().map(|t| (t - mean).powi(2)).sum();
    let r2 = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };

    Ok(Metrics {
        label: label.to_string(),
        samples: truth.len(),
        mse,
        rmse: mse.sqrt(),
        mae,
        mape,
        mape_excluded: truth.len() - mape_count,
        r2,
    })
}

/// Metrics keyed by label, in first-evaluation order.
///
/// Re-evaluating a label replaces its entry without moving it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationResults {
    entries: Vec<Metrics>,
}

impl EvaluationResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `metrics`, returning the entry it replaced.
    pub fn insert(&mut self, metrics: Metrics) -> Option<Metrics> {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.label == metrics.label)
        {
            Some(entry) => Some(std::mem::replace(entry, metrics)),
            None => {
                self.entries.push(metrics);
                None
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&Metrics> {
        self.entries.iter().find(|entry| entry.label == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metrics> {
        self.entries.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lowest RMSE; the earliest label wins ties and NaN never wins.
    pub fn best_by_rmse(&self) -> Option<&Metrics> {
        self.entries.iter().fold(None, |best: Option<&Metrics>, entry| match best {
            Some(current) if !(entry.rmse < current.rmse) => Some(current),
            _ if entry.rmse.is_nan() => best,
            _ => Some(entry),
        })
    }
}

impl<'a> IntoIterator for &'a EvaluationResults {
    type Item = &'a Metrics;
    type IntoIter = std::slice::Iter<'a, Metrics>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Computes metrics and records them per label.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    results: EvaluationResults,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate<S1, S2, D1, D2>(
        &mut self,
        y_true: &ArrayBase<S1, D1>,
        y_pred: &ArrayBase<S2, D2>,
        label: &str,
    ) -> Result<Metrics, ForecastError>
    where
        S1: Data<Elem = f64>,
        S2: Data<Elem = f64>,
        D1: Dimension,
        D2: Dimension,
    {
        let metrics = compute_metrics(label, y_true, y_pred)?;
        info!(
            label,
            samples = metrics.samples,
            rmse = metrics.rmse,
            mae = metrics.mae,
            r2 = metrics.r2,
            "evaluated forecasts"
        );
        self.results.insert(metrics.clone());
        Ok(metrics)
    }

    pub fn results(&self) -> &EvaluationResults {
        &self.results
    }

    pub fn into_results(self) -> EvaluationResults {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{array, Array1};

    use super::*;

    #[test]
    fn perfect_forecast() {
        let truth = array![[1.0, 2.0], [3.0, 4.0]];
        let metrics = compute_metrics("X", &truth, &truth).expect("valid");

        assert_eq!(metrics.samples, 4);
        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.mape, Some(0.0));
        assert_eq!(metrics.r2, 1.0);
    }

    #[test]
    fn known_values() {
        let metrics = compute_metrics("X", &array![2.0, 4.0], &array![1.0, 5.0]).expect("valid");

        assert_eq!(metrics.mse, 1.0);
        assert_eq!(metrics.rmse, 1.0);
        assert_eq!(metrics.mae, 1.0);
        assert_eq!(metrics.mape, Some(37.5));
        assert_eq!(metrics.r2, 0.0);
    }

    #[test]
    fn constant_truth_has_zero_r2() {
        let truth = Array1::from_elem(6, 5.0);
        let predicted = array![1.0, 9.0, 5.0, 4.0, 7.5, -3.0];

        let metrics = compute_metrics("flat", &truth, &predicted).expect("valid");

        assert_eq!(metrics.r2, 0.0);
    }

    #[test]
    fn zero_truth_entries_are_excluded_from_mape() {
        let metrics = compute_metrics("Z", &array![0.0, 10.0], &array![1.0, 11.0]).expect("valid");

        assert_eq!(metrics.mape_excluded, 1);
        let mape = metrics.mape.expect("one usable entry");
        assert!((mape - 10.0).abs() < 1e-12);

        let all_zero = compute_metrics("Z", &array![0.0, 0.0], &array![1.0, 1.0]).expect("valid");
        assert_eq!(all_zero.mape, None);
        assert_eq!(all_zero.mape_excluded, 2);
    }

    #[test]
    fn flattens_before_comparing() {
        let truth = array![[1.0, 2.0, 3.0]];
        let predicted = array![[1.0], [2.0], [3.0]];
        assert!(compute_metrics("X", &truth, &predicted).is_ok());

        let err = compute_metrics("X", &truth, &array![1.0, 2.0]).expect_err("length differs");
        assert!(matches!(err, ForecastError::ShapeMismatch { .. }));

        let empty = Array1::<f64>::zeros(0);
        let err = compute_metrics("X", &empty, &empty).expect_err("empty");
        assert!(matches!(err, ForecastError::EmptyInput { .. }));
    }

    #[test]
    fn reevaluation_overwrites_in_place() {
        let mut evaluator = Evaluator::new();
        evaluator.evaluate(&array![1.0, 2.0], &array![1.5, 2.0], "A").expect("valid");
        evaluator.evaluate(&array![1.0, 2.0], &array![1.0, 2.0], "B").expect("valid");
        evaluator.evaluate(&array![1.0, 2.0], &array![3.0, 3.0], "A").expect("valid");

        let results = evaluator.results();
        assert_eq!(results.labels(), vec!["A", "B"]);
        assert!(results.get("A").expect("stored").rmse > 1.0);
    }

    #[test]
    fn best_rmse_prefers_first_on_ties() {
        let mut evaluator = Evaluator::new();
        evaluator.evaluate(&array![1.0], &array![2.0], "first").expect("valid");
        evaluator.evaluate(&array![1.0], &array![0.0], "second").expect("valid");
        evaluator.evaluate(&array![1.0], &array![4.0], "third").expect("valid");

        let best = evaluator.results().best_by_rmse().expect("non-empty");
        assert_eq!(best.label, "first");
        assert!(EvaluationResults::new().best_by_rmse().is_none());
    }
}
