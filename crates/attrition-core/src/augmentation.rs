//! Minority-class oversampling by Gaussian jitter.
//!
//! Synthetic positives are built from existing positive rows taken in
//! wrap-around order. Only the dense prefix (base numerics and engineered
//! features) is perturbed; one-hot blocks are copied from the source row.
use ndarray::{concatenate, Array1, Array2, Axis};
use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

use crate::config::AugmentationConfig;
use crate::error::{AttritionError, Result};

/// What an augmentation pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AugmentationSummary {
    pub enabled: bool,
    pub original_rows: usize,
    pub original_positives: usize,
    pub synthesized: usize,
}

/// Number of positives needed for `target_ratio` given `negatives`.
pub fn desired_positive_count(target_ratio: f64, negatives: usize) -> usize {
    (target_ratio * negatives as f64 / (1.0 - target_ratio)).floor() as usize
}

/// Append synthetic positive rows to a scaled training matrix.
///
/// `dense_width` is the number of leading columns that receive noise.
/// Original rows are never altered; when the positive count already meets the
/// target, or there is no positive row to copy from, the inputs are returned
/// as they are.
pub fn augment_minority<R: Rng + ?Sized>(
    x: Array2<f32>,
    y: Array1<u8>,
    dense_width: usize,
    config: &AugmentationConfig,
    rng: &mut R,
) -> Result<(Array2<f32>, Array1<u8>, AugmentationSummary)> {
    let config = config.clamped();
    let positives: Vec<usize> = y
        .iter()
        .enumerate()
        .filter(|(_, label)| **label == 1)
        .map(|(i, _)| i)
        .collect();
    let negatives = y.len() - positives.len();

    let mut summary = AugmentationSummary {
        enabled: config.enabled,
        original_rows: y.len(),
        original_positives: positives.len(),
        synthesized: 0,
    };
    if !config.enabled {
        return Ok((x, y, summary));
    }

    let want = desired_positive_count(config.target_ratio, negatives);
    if positives.len() >= want {
        log::debug!(
            "Augmentation skipped: {} positives already meet target {}",
            positives.len(),
            want
        );
        return Ok((x, y, summary));
    }
    if positives.is_empty() {
        log::warn!("Augmentation skipped: training partition has no positive rows");
        return Ok((x, y, summary));
    }

    let need = want - positives.len();
    let noise = if config.noise_std > 0.0 {
        Some(Normal::new(0.0, config.noise_std).map_err(|e| {
            AttritionError::configuration(format!("invalid augmentation noise: {}", e))
        })?)
    } else {
        None
    };

    let dense_width = dense_width.min(x.ncols());
    let mut synthetic = Array2::<f32>::zeros((need, x.ncols()));
    for (k, mut row) in synthetic.axis_iter_mut(Axis(0)).enumerate() {
        let source = positives[k % positives.len()];
        row.assign(&x.row(source));
        if let Some(normal) = &noise {
            for v in row.iter_mut().take(dense_width) {
                *v += normal.sample(rng) as f32;
            }
        }
    }

    let x = concatenate(Axis(0), &[x.view(), synthetic.view()]).map_err(|e| {
        AttritionError::configuration(format!("augmented matrix shape mismatch: {}", e))
    })?;
    let y = concatenate(Axis(0), &[y.view(), Array1::from_elem(need, 1u8).view()]).map_err(
        |e| AttritionError::configuration(format!("augmented label shape mismatch: {}", e)),
    )?;

    summary.synthesized = need;
    log::info!(
        "Augmented training partition with {} synthetic positives ({} -> {} rows)",
        need,
        summary.original_rows,
        y.len()
    );

    Ok((x, y, summary))
}
