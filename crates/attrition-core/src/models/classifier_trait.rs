use ndarray::{Array1, Array2};

use crate::config::TrainingConfig;
use crate::error::Result;
use crate::stats::{evaluate_probabilities, EpochRecord, EvaluationReport, TrainingHistory};

/// Contract shared by binary attrition classifiers. Labels use 1 for
/// attrition and 0 otherwise.
pub trait ClassifierModel {
    /// Train on `x`/`y`, calling `on_epoch` after every completed epoch.
    fn fit_with_callback(
        &mut self,
        x: &Array2<f32>,
        y: &Array1<u8>,
        config: &TrainingConfig,
        on_epoch: &mut dyn FnMut(&EpochRecord),
    ) -> Result<TrainingHistory>;

    /// Per-row attrition probabilities in `[0, 1]`.
    fn predict(&self, x: &Array2<f32>) -> Result<Vec<f32>>;

    fn fit(
        &mut self,
        x: &Array2<f32>,
        y: &Array1<u8>,
        config: &TrainingConfig,
    ) -> Result<TrainingHistory> {
        self.fit_with_callback(x, y, config, &mut |_| {})
    }

    /// Threshold predictions and score them against `y`.
    fn evaluate(
        &self,
        x: &Array2<f32>,
        y: &Array1<u8>,
        threshold: f32,
    ) -> Result<EvaluationReport> {
        let probabilities = self.predict(x)?;
        Ok(evaluate_probabilities(&probabilities, &y.to_vec(), threshold))
    }

    fn name(&self) -> &str {
        "classifier"
    }
}
