use serde::{Deserialize, Serialize};

use crate::split::{MAX_TEST_FRACTION, MIN_TEST_FRACTION};

fn clamp_f64(field: &str, value: f64, lo: f64, hi: f64) -> f64 {
    // NaN falls outside every range; treat it as the lower bound.
    let clamped = if value.is_nan() { lo } else { value.clamp(lo, hi) };
    if clamped != value {
        log::warn!("{} = {} is out of range, using {}", field, value, clamped);
    }
    clamped
}

fn at_least(field: &str, value: usize, min: usize) -> usize {
    if value < min {
        log::warn!("{} = {} is below the minimum, using {}", field, value, min);
        min
    } else {
        value
    }
}

/// Synthetic oversampling of the positive class.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AugmentationConfig {
    pub enabled: bool,
    pub target_ratio: f64,
    pub noise_std: f64,
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            target_ratio: 0.5,
            noise_std: 0.05,
        }
    }
}

impl AugmentationConfig {
    pub fn clamped(&self) -> Self {
        Self {
            enabled: self.enabled,
            target_ratio: clamp_f64("augmentation.target_ratio", self.target_ratio, 0.2, 0.8),
            noise_std: clamp_f64("augmentation.noise_std", self.noise_std, 0.0, 0.2),
        }
    }
}

/// Controls how a loaded dataset becomes train/test matrices.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PreparationConfig {
    pub test_fraction: f64,
    pub seed: u64,
    pub augmentation: AugmentationConfig,
}

impl Default for PreparationConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            augmentation: AugmentationConfig::default(),
        }
    }
}

impl PreparationConfig {
    pub fn clamped(&self) -> Self {
        Self {
            test_fraction: clamp_f64(
                "preparation.test_fraction",
                self.test_fraction,
                MIN_TEST_FRACTION,
                MAX_TEST_FRACTION,
            ),
            seed: self.seed,
            augmentation: self.augmentation.clamped(),
        }
    }
}

/// Recurrent network architecture and optimiser settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of steps each feature vector is split into.
    pub timesteps: usize,
    /// Hidden size of every LSTM layer.
    pub units: usize,
    pub layers: usize,
    pub learning_rate: f64,
    pub dropout: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            timesteps: 1,
            units: 64,
            layers: 2,
            learning_rate: 1e-3,
            dropout: 0.2,
        }
    }
}

impl ModelConfig {
    pub const MIN_UNITS: usize = 8;

    pub fn clamped(&self) -> Self {
        Self {
            timesteps: self.timesteps,
            units: at_least("model.units", self.units, Self::MIN_UNITS),
            layers: at_least("model.layers", self.layers, 1),
            learning_rate: self.learning_rate,
            dropout: clamp_f64("model.dropout", self.dropout as f64, 0.0, 0.9) as f32,
        }
    }
}

/// Training loop settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub validation_split: f64,
    pub patience: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 32,
            validation_split: 0.2,
            patience: 5,
        }
    }
}

impl TrainingConfig {
    pub fn clamped(&self) -> Self {
        Self {
            epochs: at_least("training.epochs", self.epochs, 1),
            batch_size: at_least("training.batch_size", self.batch_size, 1),
            validation_split: clamp_f64(
                "training.validation_split",
                self.validation_split,
                0.05,
                0.4,
            ),
            patience: at_least("training.patience", self.patience, 2),
        }
    }
}

/// Everything a single train/evaluate run needs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub preparation: PreparationConfig,
    pub model: ModelConfig,
    pub training: TrainingConfig,
    pub decision_threshold: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            preparation: PreparationConfig::default(),
            model: ModelConfig::default(),
            training: TrainingConfig::default(),
            decision_threshold: 0.5,
        }
    }
}

impl PipelineConfig {
    pub fn clamped(&self) -> Self {
        Self {
            preparation: self.preparation.clamped(),
            model: self.model.clamped(),
            training: self.training.clamped(),
            decision_threshold: self.decision_threshold,
        }
    }
}
