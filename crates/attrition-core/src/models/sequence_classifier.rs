//! Stacked-LSTM binary classifier built on candle.
//!
//! Feature vectors are viewed as short sequences of `timesteps` steps. The
//! network is `layers` LSTM layers (input dropout on each), a ReLU dense
//! layer with dropout, and a single logit whose sigmoid is the attrition
//! probability.
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use candle_nn::rnn::{lstm, LSTMConfig, LSTM};
use candle_nn::{
    linear, AdamW, Dropout, Linear, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap, RNN,
};
use ndarray::{s, Array1, Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, TrainingConfig};
use crate::error::{AttritionError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::stats::{EpochRecord, TrainingHistory};

/// Minimum validation-loss decrease that counts as an improvement.
pub const MIN_DELTA: f32 = 1e-4;

const PREDICT_BATCH: usize = 512;
const MIN_DENSE_UNITS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelState {
    Unbuilt,
    Built,
    Trained,
    Disposed,
}

/// Everything needed to recreate the network's parameter shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceArchitecture {
    pub timesteps: usize,
    /// Values per timestep.
    pub features: usize,
    pub units: usize,
    pub layers: usize,
    pub learning_rate: f64,
    pub dropout: f32,
}

impl SequenceArchitecture {
    /// Derive the architecture for feature vectors of `width` values.
    ///
    /// `width` must split evenly into `config.timesteps` steps.
    pub fn for_width(width: usize, config: &ModelConfig) -> Result<Self> {
        let config = config.clamped();
        if config.timesteps == 0 || width % config.timesteps != 0 {
            return Err(AttritionError::configuration(format!(
                "feature width {} cannot be split into {} timesteps",
                width, config.timesteps
            )));
        }
        Ok(SequenceArchitecture {
            timesteps: config.timesteps,
            features: width / config.timesteps,
            units: config.units,
            layers: config.layers,
            learning_rate: config.learning_rate,
            dropout: config.dropout,
        })
    }

    pub fn input_width(&self) -> usize {
        self.timesteps * self.features
    }

    pub fn dense_units(&self) -> usize {
        (self.units / 2).max(MIN_DENSE_UNITS)
    }

    fn validate(&self) -> Result<()> {
        if self.timesteps == 0 {
            return Err(AttritionError::configuration(
                "timesteps must be a positive integer",
            ));
        }
        if self.features == 0 {
            return Err(AttritionError::configuration(
                "features must be a positive integer",
            ));
        }
        if self.units == 0 || self.layers == 0 {
            return Err(AttritionError::configuration(
                "units and layers must be positive integers",
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate >= 0.0) {
            return Err(AttritionError::configuration(format!(
                "learning rate {} must be a non-negative number",
                self.learning_rate
            )));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(AttritionError::configuration(format!(
                "dropout {} must lie in [0, 1)",
                self.dropout
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Network {
    lstms: Vec<LSTM>,
    dense: Linear,
    output: Linear,
    dropout: Dropout,
}

impl Network {
    fn new(arch: &SequenceArchitecture, vb: &VarBuilder) -> candle_core::Result<Self> {
        let mut lstms = Vec::with_capacity(arch.layers);
        for i in 0..arch.layers {
            let in_dim = if i == 0 { arch.features } else { arch.units };
            lstms.push(lstm(
                in_dim,
                arch.units,
                LSTMConfig::default(),
                vb.pp(format!("lstm{}", i)),
            )?);
        }
        let dense = linear(arch.units, arch.dense_units(), vb.pp("dense"))?;
        let output = linear(arch.dense_units(), 1, vb.pp("output"))?;
        Ok(Network {
            lstms,
            dense,
            output,
            dropout: Dropout::new(arch.dropout),
        })
    }

    /// `xs` is `(batch, timesteps, features)`; returns logits `(batch, 1)`.
    fn forward(&self, xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        let mut hidden = xs.clone();
        let last_layer = self.lstms.len() - 1;
        for (i, layer) in self.lstms.iter().enumerate() {
            let input = self.dropout.forward(&hidden, train)?;
            let states = layer.seq(&input)?;
            hidden = if i < last_layer {
                layer.states_to_tensor(&states)?
            } else {
                states
                    .last()
                    .map(|state| state.h().clone())
                    .ok_or_else(|| candle_core::Error::Msg("empty input sequence".to_string()))?
            };
        }
        let dense = self.dense.forward(&hidden)?.relu()?;
        let dense = self.dropout.forward(&dense, train)?;
        self.output.forward(&dense)
    }
}

/// Mean binary cross-entropy on logits: `max(z, 0) - z*y + log(1 + exp(-|z|))`.
fn binary_cross_entropy_with_logits(
    logits: &Tensor,
    targets: &Tensor,
) -> candle_core::Result<Tensor> {
    let softplus = logits.abs()?.neg()?.exp()?.affine(1.0, 1.0)?.log()?;
    logits
        .relu()?
        .sub(&logits.mul(targets)?)?
        .add(&softplus)?
        .mean_all()
}

pub struct SequenceClassifier {
    device: Device,
    state: ModelState,
    seed: u64,
    architecture: Option<SequenceArchitecture>,
    varmap: VarMap,
    network: Option<Network>,
}

impl SequenceClassifier {
    pub fn new(device: Device) -> Self {
        SequenceClassifier {
            device,
            state: ModelState::Unbuilt,
            seed: 42,
            architecture: None,
            varmap: VarMap::new(),
            network: None,
        }
    }

    /// Seed for the validation carve-out and batch shuffling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn architecture(&self) -> Option<&SequenceArchitecture> {
        self.architecture.as_ref()
    }

    /// Create fresh parameters for `architecture`, replacing any previous
    /// network.
    pub fn build(&mut self, architecture: SequenceArchitecture) -> Result<()> {
        architecture.validate()?;

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &self.device);
        let network = Network::new(&architecture, &vb)?;

        log::debug!(
            "Built sequence classifier: {} x {} input, {} LSTM layer(s) of {} units, dense {}",
            architecture.timesteps,
            architecture.features,
            architecture.layers,
            architecture.units,
            architecture.dense_units()
        );

        self.varmap = varmap;
        self.network = Some(network);
        self.architecture = Some(architecture);
        self.state = ModelState::Built;
        Ok(())
    }

    /// Drop all parameters. The classifier must be built again before use.
    pub fn dispose(&mut self) {
        self.release();
        self.state = ModelState::Disposed;
    }

    fn release(&mut self) {
        self.network = None;
        self.architecture = None;
        self.varmap = VarMap::new();
    }

    fn ready(&self, operation: &str) -> Result<(&Network, &SequenceArchitecture)> {
        match (&self.network, &self.architecture) {
            (Some(network), Some(arch)) => Ok((network, arch)),
            _ => Err(AttritionError::configuration(format!(
                "{} called on a classifier in state {:?}; call build first",
                operation, self.state
            ))),
        }
    }

    fn to_input(&self, x: ArrayView2<f32>, arch: &SequenceArchitecture) -> Result<Tensor> {
        if x.ncols() != arch.input_width() {
            return Err(AttritionError::configuration(format!(
                "input has {} columns, network expects {} ({} x {})",
                x.ncols(),
                arch.input_width(),
                arch.timesteps,
                arch.features
            )));
        }
        let data: Vec<f32> = x.iter().copied().collect();
        Ok(Tensor::from_vec(
            data,
            (x.nrows(), arch.timesteps, arch.features),
            &self.device,
        )?)
    }

    /// Mean loss over `rows` without touching dropout or parameters.
    fn mean_loss(&self, xs: &Tensor, ys: &Tensor, rows: &[u32]) -> Result<f32> {
        let (network, _) = self.ready("validation")?;
        let mut total = 0.0f32;
        for chunk in rows.chunks(PREDICT_BATCH) {
            let ids = Tensor::from_vec(chunk.to_vec(), chunk.len(), &self.device)?;
            let logits = network.forward(&xs.index_select(&ids, 0)?, false)?;
            let loss = binary_cross_entropy_with_logits(&logits, &ys.index_select(&ids, 0)?)?;
            total += loss.to_scalar::<f32>()? * chunk.len() as f32;
        }
        Ok(total / rows.len().max(1) as f32)
    }

    /// Write `<name>.safetensors` and `<name>.json` into `dir`.
    pub fn save<P: AsRef<Path>>(&self, dir: P, name: &str) -> Result<()> {
        let (_, arch) = self.ready("save")?;
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let (weights, arch_path) = store_paths(dir, name);

        log::info!("Saving sequence classifier weights to: {:?}", weights);
        self.varmap.save(&weights)?;
        let writer = File::create(&arch_path)?;
        serde_json::to_writer_pretty(writer, arch)?;
        Ok(())
    }

    /// Rebuild a classifier previously written by `save`.
    pub fn load<P: AsRef<Path>>(dir: P, name: &str, device: Device) -> Result<Self> {
        let (weights, arch_path) = store_paths(dir.as_ref(), name);
        let reader = BufReader::new(File::open(&arch_path)?);
        let architecture: SequenceArchitecture = serde_json::from_reader(reader)?;

        let mut classifier = SequenceClassifier::new(device);
        classifier.build(architecture)?;
        log::info!("Loading sequence classifier weights from: {:?}", weights);
        classifier.varmap.load(&weights)?;
        classifier.state = ModelState::Trained;
        Ok(classifier)
    }
}

fn store_paths(dir: &Path, name: &str) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("{}.safetensors", name)),
        dir.join(format!("{}.json", name)),
    )
}

impl ClassifierModel for SequenceClassifier {
    fn fit_with_callback(
        &mut self,
        x: &Array2<f32>,
        y: &Array1<u8>,
        config: &TrainingConfig,
        on_epoch: &mut dyn FnMut(&EpochRecord),
    ) -> Result<TrainingHistory> {
        let config = config.clamped();
        let (_, arch) = self.ready("fit")?;
        let arch = arch.clone();
        let n = x.nrows();
        if n == 0 || y.len() != n {
            return Err(AttritionError::configuration(format!(
                "fit needs a non-empty matrix with one label per row ({} rows, {} labels)",
                n,
                y.len()
            )));
        }

        let xs = self.to_input(x.view(), &arch)?;
        let ys = Tensor::from_vec(
            y.iter().map(|&v| v as f32).collect::<Vec<f32>>(),
            (n, 1),
            &self.device,
        )?;

        // Hold out the tail of one seeded shuffle for validation.
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut order: Vec<u32> = (0..n as u32).collect();
        order.shuffle(&mut rng);
        let n_val = if n >= 2 {
            ((n as f64 * config.validation_split).floor() as usize).clamp(1, n - 1)
        } else {
            0
        };
        let val_rows = order.split_off(n - n_val);
        let mut train_rows = order;

        log::debug!(
            "Fitting on {} rows ({} validation), {} epochs, batch size {}",
            train_rows.len(),
            val_rows.len(),
            config.epochs,
            config.batch_size
        );

        let params = ParamsAdamW {
            lr: arch.learning_rate,
            weight_decay: 0.0,
            ..Default::default()
        };
        let mut opt = AdamW::new(self.varmap.all_vars(), params)?;

        let mut history = TrainingHistory::default();
        let mut best_val_loss = f32::INFINITY;
        let mut patience_counter = 0;

        for epoch in 0..config.epochs {
            train_rows.shuffle(&mut rng);
            let mut total_loss = 0.0f32;
            {
                let (network, _) = self.ready("fit")?;
                for chunk in train_rows.chunks(config.batch_size) {
                    let ids = Tensor::from_vec(chunk.to_vec(), chunk.len(), &self.device)?;
                    let logits = network.forward(&xs.index_select(&ids, 0)?, true)?;
                    let loss =
                        binary_cross_entropy_with_logits(&logits, &ys.index_select(&ids, 0)?)?;
                    opt.backward_step(&loss)?;
                    total_loss += loss.to_scalar::<f32>()? * chunk.len() as f32;
                }
            }
            let loss = total_loss / train_rows.len().max(1) as f32;
            let val_loss = if val_rows.is_empty() {
                loss
            } else {
                self.mean_loss(&xs, &ys, &val_rows)?
            };

            let record = EpochRecord {
                epoch,
                loss,
                val_loss,
            };
            history.push(record);
            log::debug!(
                "Epoch {}: loss {:.5}, val_loss {:.5}",
                epoch,
                loss,
                val_loss
            );
            on_epoch(&record);

            if val_loss < best_val_loss - MIN_DELTA {
                best_val_loss = val_loss;
                patience_counter = 0;
            } else {
                patience_counter += 1;
                if patience_counter >= config.patience {
                    log::info!(
                        "Early stopping at epoch {} (no improvement for {} epochs, best val_loss {:.5})",
                        epoch,
                        patience_counter,
                        best_val_loss
                    );
                    history.stopped_early = true;
                    break;
                }
            }
        }

        self.state = ModelState::Trained;
        Ok(history)
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Vec<f32>> {
        let (network, arch) = self.ready("predict")?;
        let mut probabilities = Vec::with_capacity(x.nrows());
        let mut start = 0;
        while start < x.nrows() {
            let end = (start + PREDICT_BATCH).min(x.nrows());
            let xs = self.to_input(x.slice(s![start..end, ..]), arch)?;
            let logits = network.forward(&xs, false)?;
            let batch = candle_nn::ops::sigmoid(&logits)?
                .flatten_all()?
                .to_vec1::<f32>()?;
            probabilities.extend(batch);
            start = end;
        }
        Ok(probabilities)
    }

    fn name(&self) -> &str {
        "sequence_lstm"
    }
}
