use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{
    check_inputs, check_validation, mean_squared, FittedShape, Monitor, Predictor,
    TrainingSummary,
};
use crate::window::Dataset;
use crate::ForecastError;

/// Hyper-parameters for [`LinearRegressor`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearConfig {
    pub epochs: usize,
    pub batch_size: usize,
    /// Epochs without improvement before stopping.
    pub patience: usize,
    /// Gradient step, divided by the window size.
    pub learning_rate: f64,
    pub seed: u64,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            batch_size: 16,
            patience: 50,
            learning_rate: 0.5,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Fitted {
    shape: FittedShape,
    weights: Array2<f64>,
    bias: Array1<f64>,
}

/// Multi-output linear map from a window to its horizon.
///
/// Trained by mini-batch gradient descent on MSE. Batches are drawn from a
/// seeded shuffle of the training windows only; validation windows keep their
/// order. The weights of the best monitored epoch are restored at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRegressor {
    config: LinearConfig,
    fitted: Option<Fitted>,
}

impl Default for LinearRegressor {
    fn default() -> Self {
        Self::new(LinearConfig::default())
    }
}

impl LinearRegressor {
    pub fn new(config: LinearConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }

    pub const fn config(&self) -> &LinearConfig {
        &self.config
    }

    /// `window_size x prediction_steps` weights once trained.
    pub fn weights(&self) -> Option<&Array2<f64>> {
        self.fitted.as_ref().map(|fitted| &fitted.weights)
    }

    pub fn bias(&self) -> Option<&Array1<f64>> {
        self.fitted.as_ref().map(|fitted| &fitted.bias)
    }
}

fn forward(inputs: &ArrayView2<'_, f64>, weights: &Array2<f64>, bias: &Array1<f64>) -> Array2<f64> {
    inputs.dot(weights) + bias
}

impl Predictor for LinearRegressor {
    fn name(&self) -> &str {
        "linear"
    }

    fn train(
        &mut self,
        train: &Dataset,
        validation: Option<&Dataset>,
    ) -> Result<TrainingSummary, ForecastError> {
        check_validation(train, validation)?;
        let LinearConfig {
            epochs,
            batch_size,
            patience,
            learning_rate,
            seed,
        } = self.config;
        if epochs == 0 || batch_size == 0 {
            return Err(ForecastError::configuration(
                "epochs and batch_size must be positive",
            ));
        }

        let shape = FittedShape::of(train);
        let inputs = train.inputs();
        let targets = train.targets();
        let monitored_set = validation
            .filter(|dataset| !dataset.is_empty())
            .map(|dataset| (dataset.inputs(), dataset.targets()));
        let monitored = if monitored_set.is_some() {
            Monitor::ValidationLoss
        } else {
            Monitor::TrainingLoss
        };

        let step = learning_rate / shape.window_size as f64;
        let mut weights = Array2::<f64>::zeros((shape.window_size, shape.prediction_steps));
        let mut bias = Array1::<f64>::zeros(shape.prediction_steps);
        let mut best = (f64::INFINITY, 0_usize, weights.clone(), bias.clone());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut order: Vec<usize> = (0..train.len()).collect();
        let mut waited = 0;
        let mut epochs_run = 0;

        for epoch in 1..=epochs {
            order.shuffle(&mut rng);
            for batch in order.chunks(batch_size) {
                let batch_inputs = inputs.select(Axis(0), batch);
                let batch_targets = targets.select(Axis(0), batch);
                let error = forward(&batch_inputs.view(), &weights, &bias) - &batch_targets;
                let scale = 2.0 / batch.len() as f64;
                let grad_weights = batch_inputs.t().dot(&error) * scale;
                let grad_bias = error.sum_axis(Axis(0)) * scale;
                weights.scaled_add(-step, &grad_weights);
                bias.scaled_add(-step, &grad_bias);
            }
            epochs_run = epoch;

            let loss = match &monitored_set {
                Some((val_inputs, val_targets)) => {
                    mean_squared(&forward(&val_inputs.view(), &weights, &bias), val_targets)
                }
                None => mean_squared(&forward(&inputs.view(), &weights, &bias), &targets),
            };
            trace!(epoch, loss, %monitored, "epoch finished");
            if !loss.is_finite() {
                return Err(ForecastError::TrainingDiverged { epoch });
            }

            if loss < best.0 {
                best = (loss, epoch, weights.clone(), bias.clone());
                waited = 0;
            } else {
                waited += 1;
                if waited >= patience {
                    debug!(epoch, best_epoch = best.1, "early stopping");
                    break;
                }
            }
        }

        let (best_loss, best_epoch, weights, bias) = best;
        self.fitted = Some(Fitted {
            shape,
            weights,
            bias,
        });

        Ok(TrainingSummary {
            model: self.name().to_string(),
            train_windows: train.len(),
            validation_windows: validation.map_or(0, Dataset::len),
            epochs_run,
            best_epoch,
            best_loss,
            monitored,
        })
    }

    fn predict(&self, inputs: ArrayView2<'_, f64>) -> Result<Array2<f64>, ForecastError> {
        check_inputs(self.name(), self.fitted.as_ref().map(|f| f.shape), &inputs)?;
        match &self.fitted {
            Some(fitted) => Ok(forward(&inputs, &fitted.weights, &fitted.bias)),
            None => Err(ForecastError::NotTrained {
                model: self.name().to_string(),
            }),
        }
    }

    fn is_trained(&self) -> bool {
        self.fitted.is_some()
    }
}
