//! Turns a loaded table into the immutable train/test matrices consumed by
//! the classifier.
//!
//! `prepare_dataset` is the only entry point. It fits the categorical encoder
//! on every row, splits by label, fits the scaler on the training partition,
//! and optionally oversamples positives. Every intermediate matrix is owned by
//! this function and dropped before it returns; only the result survives.
use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::augmentation::{augment_minority, AugmentationSummary};
use crate::config::PreparationConfig;
use crate::data_handling::{LoadedDataset, Record};
use crate::encoding::{CategoricalEncoder, FeatureLayout};
use crate::error::{AttritionError, Result};
use crate::feature_engineering::numeric_fragments;
use crate::preprocessing::Scaler;
use crate::schema::META_ATTRIBUTES;
use crate::split::{stratified_split, DatasetSplit};

/// Offset mixed into the seed for the augmentation generator so that it is
/// independent of the shuffle stream.
const AUGMENTATION_SEED_OFFSET: u64 = 0x9E37_79B9;

#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub layout: FeatureLayout,
    pub encoder: CategoricalEncoder,
    pub scaler: Scaler,
    pub split: DatasetSplit,
    pub x_train: Array2<f32>,
    pub y_train: Array1<u8>,
    pub x_test: Array2<f32>,
    pub y_test: Array1<u8>,
    /// Identifying attributes of each test row, in `split.test` order.
    pub test_meta: Vec<BTreeMap<String, String>>,
    pub augmentation: AugmentationSummary,
}

impl PreparedDataset {
    pub fn feature_width(&self) -> usize {
        self.layout.width()
    }

    pub fn log_summary(&self) {
        let train_pos = self.y_train.iter().filter(|&&v| v == 1).count();
        let test_pos = self.y_test.iter().filter(|&&v| v == 1).count();
        log::info!("-----------------------------------------------");
        log::info!("Prepared dataset");
        log::info!(
            "Features: {} ({} dense, {} one-hot)",
            self.layout.width(),
            self.layout.dense_width,
            self.layout.width() - self.layout.dense_width
        );
        log::info!(
            "Train rows: {} ({} positive, {} synthetic)",
            self.x_train.nrows(),
            train_pos,
            self.augmentation.synthesized
        );
        log::info!("Test rows: {} ({} positive)", self.x_test.nrows(), test_pos);
        log::info!("-----------------------------------------------");
    }
}

/// Encode every record into one row of the full feature matrix.
pub fn feature_matrix(
    records: &[Record],
    encoder: &CategoricalEncoder,
    layout: &FeatureLayout,
) -> Result<(Array2<f32>, Array1<u8>)> {
    let rows: Vec<(Vec<f32>, u8)> = numeric_fragments(records)
        .into_par_iter()
        .zip(records.par_iter())
        .map(|((mut values, label), record)| {
            encoder.encode_into(record, &mut values);
            (values, label)
        })
        .collect();

    let width = layout.width();
    let mut flat = Vec::with_capacity(rows.len() * width);
    let mut labels = Vec::with_capacity(rows.len());
    for (values, label) in rows {
        if values.len() != width {
            return Err(AttritionError::configuration(format!(
                "feature vector has {} values, layout expects {}",
                values.len(),
                width
            )));
        }
        flat.extend(values);
        labels.push(label);
    }

    let x = Array2::from_shape_vec((labels.len(), width), flat)
        .map_err(|e| AttritionError::configuration(format!("feature matrix shape: {}", e)))?;
    Ok((x, Array1::from(labels)))
}

fn meta_of(record: &Record) -> BTreeMap<String, String> {
    META_ATTRIBUTES
        .iter()
        .filter_map(|name| record.get(name).map(|v| (name.to_string(), v.to_string())))
        .collect()
}

/// Build train/test matrices from `dataset`.
///
/// Same dataset and same config always give the same split, scaler and
/// matrices.
pub fn prepare_dataset(
    dataset: &LoadedDataset,
    config: &PreparationConfig,
) -> Result<PreparedDataset> {
    let config = config.clamped();

    let encoder = CategoricalEncoder::fit(dataset);
    let layout = FeatureLayout::from_encoder(&encoder);
    let (x, y) = feature_matrix(&dataset.records, &encoder, &layout)?;
    log::debug!("Encoded {} rows into {} features", x.nrows(), x.ncols());

    let labels = y.to_vec();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let split = stratified_split(&labels, config.test_fraction, &mut rng);

    let x_train_raw = x.select(Axis(0), &split.train);
    let y_train = y.select(Axis(0), &split.train);
    let x_test_raw = x.select(Axis(0), &split.test);
    let y_test = y.select(Axis(0), &split.test);
    drop(x);

    let scaler = Scaler::fit(&x_train_raw);
    let x_train = scaler.transform(&x_train_raw);
    let x_test = scaler.transform(&x_test_raw);

    let mut aug_rng = StdRng::seed_from_u64(config.seed.wrapping_add(AUGMENTATION_SEED_OFFSET));
    let (x_train, y_train, augmentation) = augment_minority(
        x_train,
        y_train,
        layout.dense_width,
        &config.augmentation,
        &mut aug_rng,
    )?;

    let test_meta = split
        .test
        .iter()
        .map(|&i| meta_of(&dataset.records[i]))
        .collect();

    let prepared = PreparedDataset {
        layout,
        encoder,
        scaler,
        split,
        x_train,
        y_train,
        x_test,
        y_test,
        test_meta,
        augmentation,
    };
    prepared.log_summary();
    Ok(prepared)
}
