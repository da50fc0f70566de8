use candle_core::Device;

use crate::config::ModelConfig;
use crate::error::Result;
use crate::models::sequence_classifier::{SequenceArchitecture, SequenceClassifier};

/// Build a ready-to-train classifier for feature vectors of `width` values.
pub fn build_model(
    width: usize,
    config: &ModelConfig,
    device: Device,
    seed: u64,
) -> Result<SequenceClassifier> {
    let architecture = SequenceArchitecture::for_width(width, config)?;
    let mut classifier = SequenceClassifier::new(device).with_seed(seed);
    classifier.build(architecture)?;
    Ok(classifier)
}
