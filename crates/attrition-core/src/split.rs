//! Deterministic, label-stratified train/test partitioning.
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const MIN_TEST_FRACTION: f64 = 0.05;
pub const MAX_TEST_FRACTION: f64 = 0.9;

/// Disjoint row-index sets covering every row exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl DatasetSplit {
    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train.is_empty() && self.test.is_empty()
    }
}

/// Split row indices by label so both partitions keep roughly the global
/// positive rate.
///
/// Each label bucket is shuffled independently with `rng`; the test set takes
/// `floor(n * test_fraction)` rows, allocated between classes by the positive
/// rate and capped at the bucket sizes. Both resulting index lists are
/// shuffled again so classes are interleaved.
pub fn stratified_split<R: Rng + ?Sized>(
    labels: &[u8],
    test_fraction: f64,
    rng: &mut R,
) -> DatasetSplit {
    let fraction = test_fraction.clamp(MIN_TEST_FRACTION, MAX_TEST_FRACTION);
    let n = labels.len();

    let (mut positives, mut negatives): (Vec<usize>, Vec<usize>) =
        (0..n).partition(|&i| labels[i] == 1);
    positives.shuffle(rng);
    negatives.shuffle(rng);

    let n_test = (n as f64 * fraction).floor() as usize;
    let positive_rate = if n == 0 {
        0.0
    } else {
        positives.len() as f64 / n as f64
    };
    let test_pos = ((n_test as f64 * positive_rate).round() as usize).min(positives.len());
    let test_neg = (n_test - test_pos).min(negatives.len());

    let mut test: Vec<usize> = positives[..test_pos]
        .iter()
        .chain(negatives[..test_neg].iter())
        .copied()
        .collect();
    let mut train: Vec<usize> = positives[test_pos..]
        .iter()
        .chain(negatives[test_neg..].iter())
        .copied()
        .collect();
    test.shuffle(rng);
    train.shuffle(rng);

    log::debug!(
        "Stratified split: {} train / {} test ({} positive in test, fraction {:.2})",
        train.len(),
        test.len(),
        test_pos,
        fraction
    );

    DatasetSplit { train, test }
}
